use std::collections::{HashMap, HashSet};

use log::trace;

use m3c_common::assem::Instr;
use m3c_common::frame::{Access, Codegen, Frame};
use m3c_common::temp::Temp;
use m3c_common::tree::{Exp, Stm};

/// Move every spilled temporary into its own frame slot. Each instruction
/// touching one gets a fresh temporary instead, loaded just before and stored
/// just after the instruction as needed. The fresh temporaries have tiny live
/// ranges and are added to `unspillable`.
pub fn rewrite<C: Codegen>(
    frame: &mut C::Frame,
    codegen: &mut C,
    instrs: Vec<Instr>,
    spills: &[Temp],
    unspillable: &mut HashSet<Temp>,
) -> Vec<Instr> {
    let slots: HashMap<Temp, Access> = spills
        .iter()
        .map(|temp| (*temp, frame.alloc_local(true)))
        .collect();

    let mut res = Vec::with_capacity(instrs.len());

    for mut instr in instrs {
        let mut loads = Vec::new();
        let mut stores = Vec::new();

        for spilled in spills {
            let used = instr.uses().contains(spilled);
            let defined = instr.def().contains(spilled);

            if !used && !defined {
                continue;
            }

            let slot = slots[spilled].exp(frame.fp());
            let temp = Temp::fresh();
            unspillable.insert(temp);

            trace!("{temp} stands in for {spilled} in {instr:?}");

            if used {
                instr.replace_use(*spilled, temp);
                let load = Stm::mov(Exp::Temp(temp), slot.clone());
                loads.extend(codegen.codegen(frame, load));
            }

            if defined {
                instr.replace_def(*spilled, temp);
                let store = Stm::mov(slot, Exp::Temp(temp));
                stores.extend(codegen.codegen(frame, store));
            }
        }

        res.extend(loads);
        res.push(instr);
        res.extend(stores);
    }

    res
}
