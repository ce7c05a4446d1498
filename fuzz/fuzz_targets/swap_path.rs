#![no_main]

use libfuzzer_sys::fuzz_target;
use surge_monitor::services::filter::asset_from_path;

fuzz_target!(|path: &[u8]| {
	if let Ok(asset) = asset_from_path(path) {
		assert_eq!(asset.as_slice(), &path[path.len() - 20..]);
	}
});
