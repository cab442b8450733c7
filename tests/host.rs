use intcode::vm::*;

/// Reads two numbers and outputs their sum, forever.
const ADDER: &str = "3,100,3,101,1,100,101,102,4,102,1105,1,0";

/// Prints a prompt, then echoes one line of text back.
const ECHO_LINE: &str = "104,62,104,32,3,100,8,100,21,101,1005,101,18,4,100,1105,1,4,104,10,99,10";

/// A host which drives a machine through a conversation: it answers every
/// request for input with the next of its values, and collects the output.
fn converse(machine: &mut impl Host, mut answers: Vec<Word>) -> Vec<Word> {
    answers.reverse();
    let mut status = machine.run();
    while status == Status::MissingInput {
        match answers.pop() {
            Some(answer) => machine.push_input(answer),
            None => break,
        }
        status = machine.resume();
    }
    machine.drain_output()
}

#[test]
fn test_host_drives_machine() {
    let mut machine = Machine::load(ADDER).unwrap();
    assert_eq!(converse(&mut machine, vec![1, 2, 30, 40]), vec![3, 70]);
    assert_eq!(machine.status(), Status::MissingInput);
}

#[test]
fn test_host_drives_script() {
    let mut mock = ScriptedMachine::new()
        .expect_all([1, 2])
        .emit([3])
        .expect_all([30, 40])
        .emit([70])
        .accept();
    assert_eq!(converse(&mut mock, vec![1, 2, 30, 40]), vec![3, 70]);
    assert_eq!(Host::status(&mock), Status::MissingInput);
    assert_eq!(mock.remaining(), &[Step::Accept]);
    assert_eq!(mock.verify(), Err(Error::ScriptIncomplete { remaining: 1 }));
}

#[test]
fn test_suspend_and_resume_matches_upfront_input() {
    // Feeding input one value at a time gives the same result as queueing
    // all of it before running.
    let mut upfront = Machine::load(ADDER).unwrap();
    upfront.extend_input([1, 2, 30, 40]);
    assert_eq!(upfront.run(), Status::MissingInput);

    let mut piecemeal = Machine::load(ADDER).unwrap();
    converse(&mut piecemeal, vec![1, 2, 30, 40]);

    assert_eq!(upfront.drain_output(), vec![3, 70]);
    assert_eq!(upfront, piecemeal);
}

#[test]
fn test_ascii() {
    let mut machine = Machine::load(ECHO_LINE).unwrap();
    assert_eq!(machine.run(), Status::MissingInput);
    assert_eq!(machine.output_ascii(), "> ");

    machine.push_ascii("hi\n");
    assert_eq!(machine.resume(), Status::Halted);
    assert_eq!(machine.output_ascii(), "> hi\n");
}

#[test]
fn test_output_ascii_skips_non_characters() {
    let mock = {
        let mut mock = ScriptedMachine::new().emit_ascii("ok").emit([-1, 10]);
        mock.run();
        mock
    };
    assert_eq!(mock.output_ascii(), "ok\n");
    assert_eq!(mock.output(), &[111, 107, -1, 10]);
}

#[test]
fn test_script_mismatch() {
    let mut mock = ScriptedMachine::new().emit([1]).expect(5).emit([2]);
    mock.push_input(6);
    assert_eq!(mock.run(), Status::InvalidOpcode);
    assert_eq!(mock.output(), &[1]);
    assert_eq!(
        mock.verify(),
        Err(Error::ScriptMismatch {
            step: 1,
            expected: 5,
            found: 6
        })
    );

    // Faulted scripts stay stopped.
    mock.push_input(5);
    assert_eq!(mock.resume(), Status::InvalidOpcode);
    assert_eq!(mock.output(), &[1]);
}

#[test]
fn test_script_halt() {
    let mut mock = ScriptedMachine::with_script([Step::Emit(vec![9]), Step::Halt, Step::Emit(vec![10])]);
    assert_eq!(mock.run(), Status::Halted);
    assert_eq!(mock.drain_output(), vec![9]);
    assert_eq!(mock.remaining(), &[Step::Emit(vec![10])]);
    assert_eq!(Host::pc(&mock), 2);

    let mut empty = ScriptedMachine::new();
    assert_eq!(empty.run(), Status::Halted);
    assert!(empty.verify().is_ok());
}

#[test]
fn test_script_suspends_like_a_machine() {
    let mut mock = ScriptedMachine::new().accept().emit([1]);
    assert_eq!(mock.run(), Status::MissingInput);
    assert_eq!(mock.run(), Status::MissingInput);
    assert!(mock.output().is_empty());

    mock.push_input(123);
    assert_eq!(mock.resume(), Status::Halted);
    assert_eq!(mock.output(), &[1]);
    assert!(mock.verify().is_ok());
}

#[test]
fn test_intcode_wraps_either() {
    let mut hosts: Vec<Intcode> = vec![
        Machine::load("3,0,4,0,3,0,4,0,99").unwrap().into(),
        ScriptedMachine::new()
            .expect(4)
            .emit([4])
            .accept()
            .emit([5])
            .halt()
            .into(),
    ];

    for host in &mut hosts {
        assert_eq!(converse(host, vec![4, 5]), vec![4, 5]);
        assert_eq!(host.status(), Status::Halted);
        assert!(host.input().is_empty());
    }

    assert!(hosts[0].as_live().is_some());
    assert!(hosts[0].as_scripted().is_none());
    assert_eq!(hosts[0].as_live().and_then(|machine| machine.dump().ok()), Some(vec![5, 0, 4, 0, 3, 0, 4, 0, 99]));
    assert!(hosts[1].as_scripted().map_or(false, |mock| mock.verify().is_ok()));
}

#[test]
fn test_intcode_reports_pc() {
    let mut live = Intcode::from(Machine::load("104,1,99").unwrap());
    assert_eq!(live.run(), Status::Halted);
    assert_eq!(live.pc(), 2);

    let mut scripted = Intcode::from(ScriptedMachine::new().emit([1]).halt());
    assert_eq!(scripted.run(), Status::Halted);
    assert_eq!(scripted.pc(), 2);
    assert_eq!(scripted.drain_output(), vec![1]);
}
