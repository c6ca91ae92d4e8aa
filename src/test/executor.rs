use super::*;
use crate::error::RuntimeError;
use crate::instruction::{AccessMode, BinOp};
use crate::memory::{transition_label, MemoryLabel, Propagation, RmwOp};
use crate::thread::ThreadLocalStorage;

#[test]
fn labels_capture_current_register_values() {
    let mut registers = ThreadLocalStorage::new(4);
    registers.set(0, 2).unwrap(); // address
    registers.set(1, 40).unwrap();
    registers.set(2, 3).unwrap();

    let label = transition_label(
        &Instruction::Store {
            mode: AccessMode::REL,
            addr: 0,
            src: 1,
        },
        &registers,
    )
    .unwrap();
    assert_eq!(
        label,
        MemoryLabel::Write(crate::memory::WriteLabel {
            mode: AccessMode::REL,
            value: 40,
            dst: 2,
        })
    );

    let label = transition_label(
        &Instruction::Load {
            mode: AccessMode::ACQ,
            dst: 3,
            addr: 0,
        },
        &registers,
    )
    .unwrap();
    assert_eq!(
        label,
        MemoryLabel::Read(crate::memory::ReadLabel {
            mode: AccessMode::ACQ,
            src: 2,
        })
    );

    let label = transition_label(
        &Instruction::Fai {
            mode: AccessMode::SEQ_CST,
            dst: 3,
            addr: 0,
            increment: 2,
        },
        &registers,
    )
    .unwrap();
    match label {
        MemoryLabel::Rmw(rmw) => {
            assert_eq!(rmw.src, 2);
            assert_eq!(rmw.op, RmwOp::FetchAndIncrement { increment: 3 });
        }
        other => panic!("expected an RMW label, got {:?}", other),
    }

    for instruction in &[
        Instruction::RegConst { dst: 0, value: 1 },
        Instruction::RegBinOp {
            dst: 0,
            lhs: 1,
            rhs: 2,
            op: BinOp::Add,
        },
        Instruction::If { cond: 0, target: 0 },
    ] {
        assert_eq!(
            transition_label(instruction, &registers).unwrap(),
            MemoryLabel::Epsilon
        );
    }
}

#[test]
fn access_mode_classes() {
    use AccessMode::*;

    assert!(RLX.is_weaker_than(REL));
    assert!(RLX.is_weaker_than(ACQ));
    assert!(REL.is_weaker_than(REL_ACQ));
    assert!(REL_ACQ.is_weaker_than(SEQ_CST));

    // REL and ACQ share a class: neither is weaker than the other.
    assert!(!REL.is_weaker_than(ACQ));
    assert!(!ACQ.is_weaker_than(REL));
    assert!(REL.is_at_least(ACQ));
    assert!(ACQ.is_at_least(REL));
    assert_ne!(REL, ACQ);
}

#[test]
fn select_dispatches_threads_first_then_propagations() {
    let program = descriptor(
        &["x"],
        0,
        2,
        vec![
            // thread 0
            Instruction::RegConst { dst: 0, value: 0 },
            Instruction::RegConst { dst: 1, value: 9 },
            Instruction::Store {
                mode: AccessMode::RLX,
                addr: 0,
                src: 1,
            },
            Instruction::If { cond: 1, target: 6 },
            // thread 1
            Instruction::RegConst { dst: 1, value: 9 },
            Instruction::RegConst { dst: 1, value: 9 },
        ],
    );
    let mut executor = executor(MemoryModel::Tso, &program, &[0, 4]);

    // Thread 0 runs its whole block, leaving one buffered write behind.
    for _ in 0..4 {
        executor.thread_step(0).unwrap();
    }
    assert!(executor.threads()[0].is_completed());

    let running = executor.enabled_thread_steps();
    let propagations = executor.enabled_propagations();
    assert_eq!(running, vec![1]);
    assert_eq!(propagations, vec![Propagation::Tso { tid: 0 }]);

    // Index 0 is the thread transition, index 1 the propagation.
    executor.select(0, &running, &propagations).unwrap();
    assert_eq!(executor.threads()[1].instruction_pointer(), 5);
    assert_eq!(global(&executor, 0), 0);

    executor.select(1, &running, &propagations).unwrap();
    assert_eq!(global(&executor, 0), 9);

    assert_eq!(
        executor.select(7, &running, &propagations),
        Err(RuntimeError::InvalidSelection(7))
    );
}

#[test]
fn clones_are_independent() {
    let program = store_buffering_program(AccessMode::RLX);
    let mut original = executor(MemoryModel::Tso, &program, &[0, 6]);

    // Buffer a write in thread 0 and leave thread 1 untouched.
    for _ in 0..4 {
        original.thread_step(0).unwrap();
    }
    assert_eq!(original.enabled_propagations().len(), 1);

    let mut branch = original.clone();
    branch
        .propagation_step(Propagation::Tso { tid: 0 })
        .unwrap();
    branch.thread_step(0).unwrap();
    branch.thread_step(1).unwrap();

    // The original still has its buffered write, instruction pointers and
    // registers.
    assert_eq!(original.enabled_propagations(), vec![Propagation::Tso { tid: 0 }]);
    assert_eq!(global(&original, 0), 0);
    assert_eq!(original.threads()[0].instruction_pointer(), 4);
    assert_eq!(original.threads()[1].instruction_pointer(), 6);
    assert_eq!(register(&original, 1, 2), 0);

    // And the branch advanced past it.
    assert_eq!(global(&branch, 0), 1);
    assert_eq!(branch.threads()[0].instruction_pointer(), 5);
    assert_eq!(branch.threads()[1].instruction_pointer(), 7);
}

#[test]
fn instruction_pointers_stay_in_bounds() {
    let program = descriptor(
        &[],
        0,
        2,
        vec![
            Instruction::RegConst { dst: 0, value: 1 },
            Instruction::RegConst { dst: 1, value: 0 },
            Instruction::If { cond: 1, target: 0 },
        ],
    );
    // One thread runs the program, one starts already completed.
    let mut executor = executor(MemoryModel::Sc, &program, &[0, 3]);

    assert_eq!(executor.enabled_thread_steps(), vec![0]);
    assert!(executor.threads()[1].is_completed());

    while !executor.is_terminal() {
        let running = executor.enabled_thread_steps();
        let ip = executor.threads()[running[0]].instruction_pointer();
        assert!(ip < 3);
        executor.thread_step(running[0]).unwrap();
    }

    assert_eq!(executor.threads()[0].instruction_pointer(), 3);
    assert!(executor.threads().is_completed());
}

#[test]
fn taken_branch_jumps_to_its_target() {
    let program = descriptor(
        &[],
        0,
        2,
        vec![
            Instruction::RegConst { dst: 0, value: 1 },
            Instruction::If { cond: 0, target: 3 },
            Instruction::RegConst { dst: 1, value: 7 },
            Instruction::RegConst { dst: 0, value: 0 },
        ],
    );
    let mut executor = executor(MemoryModel::Sc, &program, &[0]);

    run_with(&mut executor, |_| 0);

    // The branch skipped instruction 2.
    assert_eq!(register(&executor, 0, 1), 0);
    assert_eq!(register(&executor, 0, 0), 0);
}

#[test]
fn sc_propagation_requests_are_rejected() {
    let program = descriptor(&["x"], 0, 1, vec![]);
    let mut executor = executor(MemoryModel::Sc, &program, &[0]);

    assert_eq!(
        executor.propagation_step(Propagation::Tso { tid: 0 }),
        Err(RuntimeError::NoPropagations)
    );
}

#[test]
fn division_by_zero_is_fatal() {
    let program = descriptor(
        &[],
        0,
        2,
        vec![
            Instruction::RegConst { dst: 0, value: 4 },
            Instruction::RegBinOp {
                dst: 0,
                lhs: 0,
                rhs: 1,
                op: BinOp::Divide,
            },
        ],
    );
    let mut executor = executor(MemoryModel::Sc, &program, &[0]);

    executor.thread_step(0).unwrap();
    assert_eq!(executor.thread_step(0), Err(RuntimeError::DivisionByZero));
    // The failed step did not advance the thread.
    assert_eq!(executor.threads()[0].instruction_pointer(), 1);
}

#[test]
fn out_of_range_addresses_are_fatal() {
    let program = descriptor(
        &["x"],
        0,
        2,
        vec![
            Instruction::RegConst { dst: 0, value: 3 },
            Instruction::Store {
                mode: AccessMode::RLX,
                addr: 0,
                src: 1,
            },
        ],
    );

    for &model in &[MemoryModel::Sc, MemoryModel::Tso, MemoryModel::Pso] {
        let mut executor = executor(model, &program, &[0]);
        executor.thread_step(0).unwrap();
        assert_eq!(
            executor.thread_step(0),
            Err(RuntimeError::InvalidAddress(3))
        );
    }
}

#[test]
fn wrapping_register_arithmetic() {
    assert_eq!(BinOp::Add.apply(u64::max_value(), 1).unwrap(), 0);
    assert_eq!(BinOp::Subtract.apply(0, 1).unwrap(), u64::max_value());
    assert_eq!(BinOp::Multiply.apply(1u64 << 63, 2).unwrap(), 0);
    assert_eq!(BinOp::Divide.apply(7, 2).unwrap(), 3);
    assert_eq!(BinOp::Less.apply(1, 2).unwrap(), 1);
    assert_eq!(BinOp::GreaterEqual.apply(2, 2).unwrap(), 1);
    assert_eq!(BinOp::Greater.apply(2, 2).unwrap(), 0);
    assert_eq!(
        BinOp::Divide.apply(1, 0),
        Err(RuntimeError::DivisionByZero)
    );
}

#[test]
fn snapshots_render_threads_and_memory() {
    let program = descriptor(
        &["x"],
        1,
        1,
        vec![Instruction::RegConst { dst: 0, value: 5 }],
    );
    let executor = executor(MemoryModel::Tso, &program, &[0]);

    let mut out = Vec::new();
    executor
        .print_snapshot(&mut out, util::Indent(0))
        .unwrap();
    let snapshot = String::from_utf8(out).unwrap();

    assert!(snapshot.contains("Threads info:"));
    assert!(snapshot.contains("Thread #0"));
    assert!(snapshot.contains("Registers' state:"));
    assert!(snapshot.contains("TSO Memory:"));
    assert!(snapshot.contains("x: 0"));
    // The anonymous cell is listed by index.
    assert!(snapshot.contains("1: 0"));
}
