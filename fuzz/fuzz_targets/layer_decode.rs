#![no_main]

use libfuzzer_sys::fuzz_target;
use luredev::resources::{
    LayerDecodeOptions, LayerDecoder, LiteralExhaustion, SCREEN_WIDTH, SuccessorSlot,
};

fuzz_target!(|data: &[u8]| {
    let Some((&policy, data)) = data.split_first() else {
        return;
    };
    let options = LayerDecodeOptions::new()
        .with_successor_slot(if policy & 1 == 0 {
            SuccessorSlot::Third
        } else {
            SuccessorSlot::Fourth
        })
        .with_literal_exhaustion(if policy & 2 == 0 {
            LiteralExhaustion::Fail
        } else {
            LiteralExhaustion::ZeroPad
        });

    let mut decoder = LayerDecoder::with_options(options);
    if let Ok(bitmap) = decoder.decode(data) {
        assert!(!bitmap.pixels().is_empty());
        assert_eq!(bitmap.pixels().len() % SCREEN_WIDTH, 0);
        assert!(bitmap.pixels().len() <= options.output_limit());
    }
    assert!(decoder.decode(data).is_err());
});
