#![no_main]

use libfuzzer_sys::fuzz_target;
use surge_monitor::{models::CalldataSchema, services::filter::CalldataDecoder};

fuzz_target!(|data: &[u8]| {
	for schema in [
		CalldataSchema::UniswapV3ExactInput,
		CalldataSchema::UniswapV3ExactInputSingle,
		CalldataSchema::Marker {
			marker: "000bb8".to_string(),
		},
	] {
		let _ = CalldataDecoder::new(schema).extract_asset(data);
	}
});
