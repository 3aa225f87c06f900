#![no_main]

use libfuzzer_sys::fuzz_target;
use purgekit::ds::IntrusiveList;

// Fuzz arbitrary operation sequences on IntrusiveList
//
// Ids are never forgotten, so remove/move calls regularly hit stale handles
// whose slot has since been reused. Those must be no-ops.
fuzz_target!(|data: &[u8]| {
    let mut list: IntrusiveList<u32> = IntrusiveList::new();
    let mut all_ids = Vec::new();

    for pair in data.chunks_exact(2) {
        let op = pair[0] % 8;
        let value = u32::from(pair[1]);

        match op {
            0 => {
                let id = list.push_front(value);
                all_ids.push(id);
                assert_eq!(list.front(), Some(&value));
                assert_eq!(list.get(id), Some(&value));
            }
            1 => {
                let id = list.push_back(value);
                all_ids.push(id);
                assert_eq!(list.back(), Some(&value));
                assert_eq!(list.get(id), Some(&value));
            }
            2 => {
                let old_len = list.len();
                match list.pop_front() {
                    Some(_) => assert_eq!(list.len(), old_len - 1),
                    None => assert_eq!(old_len, 0),
                }
            }
            3 => {
                let old_len = list.len();
                match list.pop_back() {
                    Some(_) => assert_eq!(list.len(), old_len - 1),
                    None => assert_eq!(old_len, 0),
                }
            }
            4 if !all_ids.is_empty() => {
                let id = all_ids[value as usize % all_ids.len()];
                if list.move_to_front(id) {
                    assert_eq!(list.front_id(), Some(id));
                } else {
                    assert!(!list.contains(id));
                }
            }
            5 if !all_ids.is_empty() => {
                let id = all_ids[value as usize % all_ids.len()];
                if list.move_to_back(id) {
                    assert_eq!(list.back_id(), Some(id));
                }
            }
            6 if !all_ids.is_empty() => {
                let id = all_ids[value as usize % all_ids.len()];
                let old_len = list.len();
                match list.remove(id) {
                    Some(_) => assert_eq!(list.len(), old_len - 1),
                    None => assert_eq!(list.len(), old_len),
                }
                assert!(!list.contains(id));
            }
            7 => {
                list.clear();
                assert!(list.is_empty());
            }
            _ => {}
        }

        list.debug_validate_invariants();
    }
});
