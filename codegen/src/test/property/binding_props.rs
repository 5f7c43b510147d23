use enumset::EnumSet;
use lumen_dtype::{DType, ScalarDType};
use lumen_dtype::test::proptests::generators::{bindable_dtype, buffer_generator};
use lumen_ir::Function;
use proptest::prelude::*;

use crate::binder::resolve_binding;
use crate::copy_mode::{CopyDirection, copy_mode_bits};
use crate::runtime::RuntimeSymbol;
use crate::transfer::TransferTracker;

fn arb_copy_mode() -> impl Strategy<Value = EnumSet<CopyDirection>> {
    (any::<bool>(), any::<bool>()).prop_map(|(h2d, d2h)| {
        let mut mode = EnumSet::empty();
        if h2d {
            mode |= CopyDirection::HostToDevice;
        }
        if d2h {
            mode |= CopyDirection::DeviceToHost;
        }
        mode
    })
}

proptest! {
    #[test]
    fn byte_size_is_numel_times_element_bytes(buffer in buffer_generator()) {
        let binding = resolve_binding(&buffer, 0, 0).unwrap();
        let expected = buffer.numel().unwrap() * binding.scalar.bytes() as u64;
        prop_assert_eq!(binding.byte_size as u64, expected);
    }

    #[test]
    fn every_bindable_type_has_a_matching_entry_point(scalar in bindable_dtype()) {
        let symbol = RuntimeSymbol::bind_buffer(scalar).unwrap();
        let bound = symbol.bound_element().unwrap();
        prop_assert_eq!(bound.bit_width(), scalar.bit_width());
        prop_assert_eq!(bound.is_float(), scalar.is_float());
    }

    #[test]
    fn copy_mode_bits_encode_directions(mode in arb_copy_mode()) {
        let bits = copy_mode_bits(mode);
        prop_assert!(bits <= 3);
        prop_assert_eq!(bits & 1 != 0, mode.contains(CopyDirection::HostToDevice));
        prop_assert_eq!(bits & 2 != 0, mode.contains(CopyDirection::DeviceToHost));
    }

    #[test]
    fn transfers_always_come_from_previous_launch(pattern in prop::collection::vec(0usize..3, 1..8)) {
        // Buffer `pattern[k]` is bound by launch `k`.
        let func = Function::new("main", (0..3).map(|_| DType::buffer(ScalarDType::Float32, [1])));
        let buffers = func.params();
        let mut tracker = TransferTracker::new();
        let mut last_seen = [None; 3];

        for (launch, &index) in pattern.iter().enumerate() {
            let actions = tracker.observe(launch, &[buffers[index]]);
            match last_seen[index] {
                Some(previous) => {
                    prop_assert_eq!(actions.len(), 1);
                    prop_assert_eq!(actions[0].src.launch, previous);
                    prop_assert_eq!(actions[0].dst.launch, launch);
                }
                None => prop_assert!(actions.is_empty()),
            }
            last_seen[index] = Some(launch);
        }
    }
}
