use std::collections::HashMap;

use matches::debug_assert_matches;
use pest::iterators::Pair;

use util::ParseEnumError;
use wmm::instruction::{AccessMode, BinOp, Instruction};
use wmm::program::ProgramDescriptor;
use wmm::{MemoryCell, Register, Value};

use crate::labels::{collect_labels, LabelMap};
use crate::{new_parser_error, Result, Rule};

/// Interns register names in order of first sight. The resulting file
/// covers every distinct register name in the whole program.
#[derive(Default)]
struct RegisterTable<'i> {
    indices: HashMap<&'i str, Register>,
    names: Vec<String>,
}

impl<'i> RegisterTable<'i> {
    fn intern(&mut self, name: &'i str) -> Register {
        match self.indices.get(name) {
            Some(&index) => index,
            None => {
                let index = self.names.len();
                self.indices.insert(name, index);
                self.names.push(name.to_string());
                index
            }
        }
    }
}

/// Second pass: turns a parsed `program` pair into a descriptor.
pub fn process_program(pair: Pair<Rule>) -> Result<ProgramDescriptor> {
    debug_assert_matches!(pair.as_rule(), Rule::program);

    let mut memory_name: Vec<String> = Vec::new();
    let mut memory_index: HashMap<&str, MemoryCell> = HashMap::new();
    let mut reserved = 0usize;
    let mut labeled: Vec<Pair<Rule>> = Vec::new();

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::shared_state => {
                process_shared_state(inner, &mut memory_name, &mut memory_index)?
            }
            Rule::reserve_space => reserved = process_reserve_space(inner)?,
            Rule::labeled_instruction => labeled.push(inner),
            Rule::EOI => {}
            _ => unreachable!(),
        }
    }

    let labels = collect_labels(&labeled)?;

    let mut registers = RegisterTable::default();
    let mut instructions = Vec::with_capacity(labeled.len());
    let mut instructions_str = Vec::with_capacity(labeled.len());

    for pair in labeled {
        instructions_str.push(normalized_source(&pair));
        instructions.push(process_labeled_instruction(
            pair,
            &labels,
            &memory_index,
            &mut registers,
        )?);
    }

    Ok(ProgramDescriptor {
        memory_size: memory_name.len() + reserved,
        instructions,
        instructions_str,
        memory_name,
        register_name: registers.names,
    })
}

fn process_shared_state<'i>(
    pair: Pair<'i, Rule>,
    memory_name: &mut Vec<String>,
    memory_index: &mut HashMap<&'i str, MemoryCell>,
) -> Result<()> {
    for identifier in pair.into_inner() {
        let name = identifier.as_str();
        if memory_index.contains_key(name) {
            return Err(new_parser_error(
                identifier.as_span(),
                format!("Duplicate shared variable \"{}\"", name),
            ));
        }
        memory_index.insert(name, memory_name.len());
        memory_name.push(name.to_string());
    }
    Ok(())
}

fn process_reserve_space(pair: Pair<Rule>) -> Result<usize> {
    let integer = pair.into_inner().next().unwrap();
    let span = integer.as_span();
    integer.as_str().parse().map_err(|_| {
        new_parser_error(
            span,
            format!("Reserved space size \"{}\" is out of range", integer.as_str()),
        )
    })
}

/// The normalized source form of one instruction, label prefix included and
/// terminating semicolon excluded.
fn normalized_source(pair: &Pair<Rule>) -> String {
    let mut pairs = pair.clone().into_inner();
    let first = pairs.next().unwrap();
    if first.as_rule() == Rule::label {
        let name = first.into_inner().next().unwrap();
        let instruction = pairs.next().unwrap();
        format!("{}: {}", name.as_str(), normalize(instruction.as_str()))
    } else {
        normalize(first.as_str())
    }
}

fn normalize(source: &str) -> String {
    source.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn process_labeled_instruction<'i>(
    pair: Pair<'i, Rule>,
    labels: &LabelMap<'i>,
    memory_index: &HashMap<&'i str, MemoryCell>,
    registers: &mut RegisterTable<'i>,
) -> Result<Instruction> {
    let mut pairs = pair.into_inner();
    let first = pairs.next().unwrap();
    let instruction = if first.as_rule() == Rule::label {
        pairs.next().unwrap()
    } else {
        first
    };
    process_instruction(instruction, labels, memory_index, registers)
}

fn process_instruction<'i>(
    pair: Pair<'i, Rule>,
    labels: &LabelMap<'i>,
    memory_index: &HashMap<&'i str, MemoryCell>,
    registers: &mut RegisterTable<'i>,
) -> Result<Instruction> {
    debug_assert_matches!(pair.as_rule(), Rule::instruction);
    let inner = pair.into_inner().next().unwrap();
    let rule = inner.as_rule();
    let mut pairs = inner.into_inner();

    let instruction = match rule {
        Rule::instr_cas => {
            let dst = registers.intern(pairs.next().unwrap().as_str());
            let mode = process_mode(&pairs.next().unwrap())?;
            let addr = process_tagged(pairs.next().unwrap(), registers);
            let expected = registers.intern(pairs.next().unwrap().as_str());
            let desired = registers.intern(pairs.next().unwrap().as_str());
            Instruction::Cas {
                mode,
                dst,
                addr,
                expected,
                desired,
            }
        }
        Rule::instr_fai => {
            let dst = registers.intern(pairs.next().unwrap().as_str());
            let mode = process_mode(&pairs.next().unwrap())?;
            let addr = process_tagged(pairs.next().unwrap(), registers);
            let increment = registers.intern(pairs.next().unwrap().as_str());
            Instruction::Fai {
                mode,
                dst,
                addr,
                increment,
            }
        }
        Rule::instr_load => {
            let mode = process_mode(&pairs.next().unwrap())?;
            let addr = process_tagged(pairs.next().unwrap(), registers);
            let dst = registers.intern(pairs.next().unwrap().as_str());
            Instruction::Load { mode, dst, addr }
        }
        Rule::instr_store => {
            let mode = process_mode(&pairs.next().unwrap())?;
            let addr = process_tagged(pairs.next().unwrap(), registers);
            let src = registers.intern(pairs.next().unwrap().as_str());
            Instruction::Store { mode, addr, src }
        }
        Rule::instr_fence => Instruction::Fence {
            mode: process_mode(&pairs.next().unwrap())?,
        },
        Rule::instr_if => {
            let cond = registers.intern(pairs.next().unwrap().as_str());
            let target = pairs.next().unwrap();
            match labels.get(target.as_str()) {
                Some(&index) => Instruction::If {
                    cond,
                    target: index,
                },
                None => {
                    return Err(new_parser_error(
                        target.as_span(),
                        format!("Unknown label \"{}\" in conditional jump", target.as_str()),
                    ))
                }
            }
        }
        Rule::instr_binop => {
            let dst = registers.intern(pairs.next().unwrap().as_str());
            let lhs = registers.intern(pairs.next().unwrap().as_str());
            let op = process_binop(&pairs.next().unwrap());
            let rhs = registers.intern(pairs.next().unwrap().as_str());
            Instruction::RegBinOp { dst, lhs, rhs, op }
        }
        Rule::instr_const => {
            let dst = registers.intern(pairs.next().unwrap().as_str());
            let operand = pairs.next().unwrap();
            let value = match operand.as_rule() {
                Rule::integer => process_value(&operand)?,
                Rule::identifier => match memory_index.get(operand.as_str()) {
                    Some(&cell) => cell as Value,
                    None => {
                        return Err(new_parser_error(
                            operand.as_span(),
                            format!(
                                "Unknown shared variable \"{}\" on the right-hand side of an assignment",
                                operand.as_str()
                            ),
                        ))
                    }
                },
                _ => unreachable!(),
            };
            Instruction::RegConst { dst, value }
        }
        _ => unreachable!(),
    };
    Ok(instruction)
}

fn process_mode(pair: &Pair<Rule>) -> Result<AccessMode> {
    let span = pair.as_span();
    pair.as_str()
        .parse()
        .map_err(|err: ParseEnumError| new_parser_error(span, err.to_string()))
}

fn process_binop(pair: &Pair<Rule>) -> BinOp {
    match pair.as_str() {
        "+" => BinOp::Add,
        "-" => BinOp::Subtract,
        "*" => BinOp::Multiply,
        "/" => BinOp::Divide,
        "<" => BinOp::Less,
        ">" => BinOp::Greater,
        "<=" => BinOp::LessEqual,
        ">=" => BinOp::GreaterEqual,
        _ => unreachable!(),
    }
}

fn process_tagged<'i>(pair: Pair<'i, Rule>, registers: &mut RegisterTable<'i>) -> Register {
    let identifier = pair.into_inner().next().unwrap();
    registers.intern(identifier.as_str())
}

fn process_value(pair: &Pair<Rule>) -> Result<Value> {
    pair.as_str().parse().map_err(|_| {
        new_parser_error(
            pair.as_span(),
            format!("Integer literal \"{}\" does not fit in 64 bits", pair.as_str()),
        )
    })
}
