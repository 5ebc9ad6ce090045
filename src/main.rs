use std::io;

use memlat::{native, run, Config};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = Config::default();
    let counter = native();

    let stdout = io::stdout();
    run(&config, &counter, &mut stdout.lock())?;

    Ok(())
}
