//! A coherence check making sure no interfering temporaries were assigned the
//! same register.

use std::collections::HashMap;

use m3c_common::temp::Temp;

use super::interfere::InterferenceGraph;

pub fn check_consistency(graph: &InterferenceGraph, colors: &HashMap<Temp, Temp>) {
    for (temp, other) in graph.edges() {
        let (Some(this), Some(that)) = (colors.get(&temp), colors.get(&other)) else {
            panic!("inconsistency: {temp} or {other} was never allocated");
        };

        if this == that {
            panic!("inconsistency: both {temp} and {other} were allocated the same, but they interfere (on {this})");
        }
    }
}
