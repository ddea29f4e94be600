//! stepstar: watch an A* search walk across a random board, one step at a
//! time.

mod render;

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use stepstar_paths::{BoardGen, Grid, GridConfig, StepStatus};

use render::Activity;

#[derive(Parser, Debug)]
#[command(name = "stepstar")]
#[command(about = "Step-wise A* on a random board", long_about = None)]
struct Args {
    /// Board width in cells
    #[arg(long, default_value_t = 24)]
    width: i32,

    /// Board height in cells
    #[arg(long, default_value_t = 12)]
    height: i32,

    /// Seed for obstacles and endpoints (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Restrict movement to the four cardinal directions
    #[arg(long)]
    no_diagonal: bool,

    /// Cost of one straight step
    #[arg(long, default_value_t = 1.0)]
    stepping_cost: f64,

    /// Give up after this many steps
    #[arg(long, default_value_t = 10_000)]
    max_steps: usize,

    /// Print the board after every step
    #[arg(long)]
    watch: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut grid = Grid::with_config(GridConfig {
        width: args.width,
        height: args.height,
        can_walk_diagonal: !args.no_diagonal,
        stepping_cost: args.stepping_cost,
    })?;

    let activity = Rc::new(RefCell::new(Activity::default()));
    let sink = Rc::clone(&activity);
    grid.observe_all(move |event| {
        log::trace!("grid event: {:?}", event);
        sink.borrow_mut().record(event);
    });

    let seed = args.seed.unwrap_or_else(rand::random);
    log::info!(
        "{}x{} board, seed {}, diagonal {}",
        args.width,
        args.height,
        seed,
        !args.no_diagonal
    );
    let mut generator = BoardGen::with_rng(StdRng::seed_from_u64(seed));
    let blocked = generator.randomize_blocked(&mut grid)?;
    let Some((start, target)) = generator.randomize_start_target(&mut grid)? else {
        log::warn!("fewer than two free cells, nothing to search");
        return Ok(());
    };
    log::info!("{} cells blocked, start {}, target {}", blocked, start, target);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut status = StepStatus::Progressed;
    let mut steps = 0;
    while steps < args.max_steps {
        status = grid.step();
        steps += 1;
        if args.watch {
            if activity.borrow_mut().take_redraw() {
                writeln!(out, "-- search restarted --")?;
            }
            writeln!(out, "step {steps}: {status}")?;
            write!(out, "{}", render::board(&grid, &[]))?;
            writeln!(out)?;
        }
        if status.is_terminal() {
            break;
        }
    }

    let path = grid.path()?.unwrap_or_default();
    write!(out, "{}", render::board(&grid, &path))?;
    writeln!(out, "{status} after {steps} steps")?;
    if !path.is_empty() {
        let cost = grid.cell(target).and_then(|c| c.g()).unwrap_or_default();
        writeln!(out, "path of {} cells, cost {:.3}", path.len(), cost)?;
    }
    log::info!("{}", activity.borrow().summary());
    Ok(())
}
