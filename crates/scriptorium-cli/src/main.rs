//! `scriptorium` binary

use scriptorium_cli::{cli, init_tracing, run};

fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("verbose"));

    let stdout = std::io::stdout();
    run(&matches, &mut stdout.lock())
}
