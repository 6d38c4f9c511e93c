use std::io;

fn main() -> anyhow::Result<()> {
    // Logs go to stderr, stdout is reserved for the protocol.
    env_logger::init();

    duelist::print_engine_info();
    duelist::print_binary_info();

    if std::env::args().nth(1).as_deref() == Some("bench") {
        duelist::search::bench();
        return Ok(());
    }

    let mut input = io::stdin().lock();
    let mut output = io::stdout().lock();
    let mut engine = duelist::Engine::new(&mut input, &mut output);
    engine.protocol_loop()
}
