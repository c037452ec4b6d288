use sounding_network::{
    AnalysisError, Cell, Formula, Kind, Network, Quantity, Ref, Result, Scalar,
};
use std::{cell::RefCell, rc::Rc};

/// Adds its inputs and records the name of every evaluation in a shared log.
struct LoggingSum {
    name: &'static str,
    log: Rc<RefCell<Vec<&'static str>>>,
}

impl Formula for LoggingSum {
    fn compute(&self, inputs: &[&Quantity]) -> Result<Quantity> {
        self.log.borrow_mut().push(self.name);

        let sum = inputs
            .iter()
            .map(|q| q.to_f64().ok_or(AnalysisError::NotEnoughData))
            .sum::<Result<f64>>()?;

        Ok(Quantity::scalar(Kind::Index, sum))
    }
}

fn index(val: i32) -> Quantity {
    Quantity::index(val)
}

fn sum_cell(name: &'static str, inputs: &[Ref], log: &Rc<RefCell<Vec<&'static str>>>) -> Cell {
    Cell::new(
        name,
        inputs,
        Quantity::Scalar(Scalar::missing(Kind::Index)),
        LoggingSum {
            name,
            log: Rc::clone(log),
        },
    )
    .unwrap()
}

//
//        a
//      /   \
//     b     c
//      \   / \
//        d    |
//         \  /
//           e
//
fn diamond() -> (Network, [Ref; 5], Rc<RefCell<Vec<&'static str>>>) {
    let log = Rc::new(RefCell::new(vec![]));
    let mut net = Network::new();

    let a = net.source("a", index(1));
    let b = net.add(sum_cell("b", &[a], &log)).unwrap();
    let c = net.add(sum_cell("c", &[a], &log)).unwrap();
    let d = net.add(sum_cell("d", &[b, c], &log)).unwrap();
    let e = net.add(sum_cell("e", &[d, c], &log)).unwrap();

    (net, [a, b, c, d, e], log)
}

fn position(log: &[&str], name: &str) -> usize {
    log.iter().position(|n| *n == name).unwrap()
}

#[test]
fn configure_evaluates_in_dependency_order() {
    let (mut net, [_, _, _, d, e], log) = diamond();
    assert!(log.borrow().is_empty());
    assert!(net.value(e).unwrap().is_missing());

    net.configure().unwrap();

    let log = log.borrow();
    assert_eq!(log.len(), 4);
    assert!(position(&log, "b") < position(&log, "d"));
    assert!(position(&log, "c") < position(&log, "d"));
    assert!(position(&log, "d") < position(&log, "e"));

    assert_eq!(net.value(d).unwrap().to_f64(), Some(2.0));
    assert_eq!(net.value(e).unwrap().to_f64(), Some(3.0));
}

#[test]
fn each_cell_evaluated_once_per_change() {
    let (mut net, [a, _, _, _, e], log) = diamond();
    net.configure().unwrap();
    log.borrow_mut().clear();

    let update = net.set(a, index(10)).unwrap();

    let log = log.borrow();
    for name in &["b", "c", "d", "e"] {
        assert_eq!(log.iter().filter(|n| *n == name).count(), 1, "{}", name);
    }
    assert_eq!(update.recomputed.len(), 4);
    assert_eq!(update.changed.len(), 5);
    assert_eq!(net.value(e).unwrap().to_f64(), Some(30.0));
}

#[test]
fn cycles_are_rejected_and_leave_network_intact() {
    let (mut net, [a, b, _, d, e], log) = diamond();
    net.configure().unwrap();
    let before = net.len();

    // f feeds g, so g may not feed f.
    let f = net.source("f", index(0));
    let g = net.add(sum_cell("g", &[f, e], &log)).unwrap();
    let err = net.add_into(f, sum_cell("h", &[g], &log)).unwrap_err();
    match err {
        AnalysisError::CycleDetected { cell, .. } => assert_eq!(cell, "h"),
        other => panic!("unexpected error: {:?}", other),
    }

    assert_eq!(net.len(), before + 2);
    assert!(net.inputs_of(f).unwrap().is_empty());

    // Still works.
    net.set(a, index(2)).unwrap();
    assert_eq!(net.value(d).unwrap().to_f64(), Some(4.0));
    assert_eq!(net.value(g).unwrap().to_f64(), Some(6.0));

    // Only sources may be set.
    assert!(matches!(
        net.set(b, index(3)),
        Err(AnalysisError::NotASource(_))
    ));
}

#[test]
fn lookup_by_name() {
    let (net, [a, _, c, _, _], _) = diamond();

    assert_eq!(net.lookup("a"), Some(a));
    assert_eq!(net.lookup("c"), Some(c));
    assert_eq!(net.name(c).unwrap(), "c");
    assert!(net.lookup("z").is_none());
    assert_eq!(net.refs().count(), 5);
    assert_eq!(net.cell_count(), 4);
}

#[test]
fn failures_keep_last_value() {
    let log = Rc::new(RefCell::new(vec![]));
    let mut net = Network::new();

    let a = net.source("a", index(1));
    let half = net
        .add(
            Cell::new(
                "half",
                &[a],
                Quantity::Scalar(Scalar::missing(Kind::Index)),
                |inputs: &[&Quantity]| -> Result<Quantity> {
                    let val = inputs[0].to_f64().ok_or(AnalysisError::NotEnoughData)?;
                    if val % 2.0 != 0.0 {
                        return Err(AnalysisError::InvalidInput("odd"));
                    }
                    Ok(Quantity::scalar(Kind::Index, val / 2.0))
                },
            )
            .unwrap(),
        )
        .unwrap();
    let after = net.add(sum_cell("after", &[half], &log)).unwrap();

    net.configure().unwrap();
    assert!(net.value(half).unwrap().is_missing());
    assert!(net.failure(half).unwrap().is_some());

    net.set(a, index(4)).unwrap();
    assert_eq!(net.value(half).unwrap().to_f64(), Some(2.0));
    assert!(net.failure(half).unwrap().is_none());
    assert_eq!(net.value(after).unwrap().to_f64(), Some(2.0));

    log.borrow_mut().clear();
    let update = net.set(a, index(5)).unwrap();
    assert_eq!(update.failed, vec![half]);
    assert_eq!(net.value(half).unwrap().to_f64(), Some(2.0));
    assert!(log.borrow().is_empty());
}
