use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::{env, process};

use rocks_lang::rocks;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    let output = Rc::new(RefCell::new(io::stdout())) as Rc<RefCell<dyn io::Write>>;
    let mut rocks = rocks::new(output);

    match args.len() {
        n if n > 2 => {
            println!("Usage: rocks [script]");
            process::exit(64);
        }
        2 => rocks.run_file(args[1].clone()),
        _ => rocks.run_prompt(),
    };
}
