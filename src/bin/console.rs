use std::io;

use tasknest::console::{self, TodoApp};

fn main() -> io::Result<()> {
    let mut app = TodoApp::new();
    console::run(&mut app, io::stdin().lock(), io::stdout().lock())
}
