// SPDX-License-Identifier: AGPL-3.0-or-later
#![no_main]

use libfuzzer_sys::fuzz_target;
use treeloom_core::ConvertConfig;
use treeloom_markdown::{flat_to_markdown, markdown_to_flat};

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let config = ConvertConfig::default();

    // Any markdown must convert without panicking; nesting past the depth
    // limit is reported as an error.
    let Ok(first) = markdown_to_flat(input, &config) else {
        return;
    };
    if let Ok(rendered) = flat_to_markdown(&first, &config) {
        let _ = markdown_to_flat(&rendered, &config);
    }
});
