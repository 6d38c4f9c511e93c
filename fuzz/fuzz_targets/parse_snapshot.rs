#![no_main]
use duelist::combat::state::CombatState;
use libfuzzer_sys::fuzz_target;
use pretty_assertions::assert_eq;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(state) = CombatState::try_from(s) {
            // Printed snapshot is read back into the same state.
            let printed = state.to_string();
            assert_eq!(CombatState::try_from(printed.as_str()).ok(), Some(state));
        }
    }
});
