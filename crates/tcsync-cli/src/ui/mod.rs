mod console;

pub use console::ConsoleEcho;
