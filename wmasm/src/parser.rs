use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "wmasm.pest"]
pub struct WmasmParser;
