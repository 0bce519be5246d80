#![no_main]

use libfuzzer_sys::fuzz_target;
use strscope::StringDatabase;

fuzz_target!(|data: &[u8]| {
    if let Ok(db) = StringDatabase::from_mem(data.to_vec()) {
        for index in 0..=db.entry_count().saturating_add(1).min(4096) {
            let _ = db.resolve(index);
        }
    }
    let _ = StringDatabase::from_text_bytes(data);
});
