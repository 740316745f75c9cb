mod cli;
mod parse_pass;
mod session;
