mod cli;
mod loader;
mod terminal;

use std::process::ExitCode;

use anyhow::Result;
use nonel::definitions::DEFAULT_BRK_MAX;
use nonel::machine::Machine;
use nonel::{Config, Fault, Runner, StepOutcome};

fn main() -> ExitCode {
    env_logger::init();

    let args = match cli::Args::parse() {
        Ok(args) => args,
        Err(err) => {
            err.print().ok();
            return ExitCode::from(2);
        }
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("nonel: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: cli::Args) -> Result<()> {
    let mut machine = Machine::new(DEFAULT_BRK_MAX);
    let loaded = loader::load_all(machine.memory_mut(), &args.load_plan)?;
    if loaded == 0 {
        eprintln!("{}", cli::usage());
        anyhow::bail!("no bytes were loaded into memory");
    }

    let mut runner = Runner::new(machine, Config { delay: args.delay });
    let mut session = terminal::Session::start()?;

    let outcome = drive(&mut runner, &mut session, args.debug);

    session.teardown()?;

    Ok(outcome?)
}

/// Steps the machine to completion, refreshing the terminal once per
/// step. Held separate from `run` so the caller can always tear the
/// terminal session down, whether this returns `Ok` or a fatal `Fault`.
fn drive(runner: &mut Runner, session: &mut terminal::Session, debug: bool) -> Result<(), Fault> {
    loop {
        session.refresh(runner.machine(), debug).ok();
        match runner.tick()? {
            StepOutcome::Continue => continue,
            StepOutcome::Halted => break,
        }
    }
    session.refresh(runner.machine(), debug).ok();
    session.await_keypress().ok();
    Ok(())
}
