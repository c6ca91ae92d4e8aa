use ::pest::*;

use crate::parser::{Rule, WmasmParser};

#[test]
fn identifier() {
    parses_to! {
        parser: WmasmParser,
        input: "foo_1",
        rule: Rule::identifier,
        tokens: [identifier(0, 5)]
    };

    assert!(WmasmParser::parse(Rule::identifier, "_foo").is_err());
    assert!(WmasmParser::parse(Rule::identifier, "1foo").is_err());
}

#[test]
fn integer() {
    parses_to! {
        parser: WmasmParser,
        input: "18446744073709551615",
        rule: Rule::integer,
        tokens: [integer(0, 20)]
    };
}

#[test]
fn tagged_symbol() {
    parses_to! {
        parser: WmasmParser,
        input: "#addr",
        rule: Rule::tagged_symbol,
        tokens: [tagged_symbol(0, 5, [identifier(1, 5)])]
    };

    // The tag must sit directly on the name.
    assert!(WmasmParser::parse(Rule::tagged_symbol, "# addr").is_err());
}

#[test]
fn modes() {
    parses_to! {
        parser: WmasmParser,
        input: "SEQ_CST",
        rule: Rule::mode,
        tokens: [mode(0, 7)]
    };

    parses_to! {
        parser: WmasmParser,
        input: "REL_ACQ",
        rule: Rule::mode,
        tokens: [mode(0, 7)]
    };

    parses_to! {
        parser: WmasmParser,
        input: "RLX",
        rule: Rule::mode,
        tokens: [mode(0, 3)]
    };
}

#[test]
fn two_character_operators_win() {
    parses_to! {
        parser: WmasmParser,
        input: "<=",
        rule: Rule::binop,
        tokens: [binop(0, 2)]
    };

    parses_to! {
        parser: WmasmParser,
        input: "<",
        rule: Rule::binop,
        tokens: [binop(0, 1)]
    };
}

#[test]
fn label_token_tree() {
    parses_to! {
        parser: WmasmParser,
        input: "l:",
        rule: Rule::label,
        tokens: [label(0, 2, [identifier(0, 1)])]
    };
}

#[test]
fn shared_state_clause() {
    parses_to! {
        parser: WmasmParser,
        input: "shared_state: x y;",
        rule: Rule::shared_state,
        tokens: [shared_state(0, 18, [identifier(14, 15), identifier(16, 17)])]
    };
}

#[test]
fn reserve_space_clause() {
    parses_to! {
        parser: WmasmParser,
        input: "reserve_space: 42;",
        rule: Rule::reserve_space,
        tokens: [reserve_space(0, 18, [integer(15, 17)])]
    };
}

#[test]
fn cas_instruction_tree() {
    parses_to! {
        parser: WmasmParser,
        input: "r := cas RLX #a e d",
        rule: Rule::instr_cas,
        tokens: [instr_cas(0, 19, [
            identifier(0, 1),
            mode(9, 12),
            tagged_symbol(13, 15, [identifier(14, 15)]),
            identifier(16, 17),
            identifier(18, 19)
        ])]
    };
}

#[test]
fn load_instruction_tree() {
    parses_to! {
        parser: WmasmParser,
        input: "load ACQ #a r",
        rule: Rule::instr_load,
        tokens: [instr_load(0, 13, [
            mode(5, 8),
            tagged_symbol(9, 11, [identifier(10, 11)]),
            identifier(12, 13)
        ])]
    };
}

#[test]
fn labeled_instruction_tree() {
    parses_to! {
        parser: WmasmParser,
        input: "loop: r = 1;",
        rule: Rule::labeled_instruction,
        tokens: [labeled_instruction(0, 12, [
            label(0, 5, [identifier(0, 4)]),
            instruction(6, 11, [instr_const(6, 11, [
                identifier(6, 7),
                integer(10, 11)
            ])])
        ])]
    };
}

#[test]
fn assignments_disambiguate_from_labels() {
    parses_to! {
        parser: WmasmParser,
        input: "r := fai RLX #a i;",
        rule: Rule::labeled_instruction,
        tokens: [labeled_instruction(0, 18, [
            instruction(0, 17, [instr_fai(0, 17, [
                identifier(0, 1),
                mode(9, 12),
                tagged_symbol(13, 15, [identifier(14, 15)]),
                identifier(16, 17)
            ])])
        ])]
    };
}

#[test]
fn stray_input_after_the_program_is_rejected() {
    assert!(WmasmParser::parse(Rule::program, "r = 1; @").is_err());
}
