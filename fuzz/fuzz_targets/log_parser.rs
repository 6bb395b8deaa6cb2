#![no_main]

use libfuzzer_sys::fuzz_target;
use tracesift::analyzer::LogAnalyzer;
use tracesift::config::AnalyzerConfig;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Invariant violations surface as errors; nothing may panic
        if let Ok(mut analyzer) = LogAnalyzer::new(input, &AnalyzerConfig::default()) {
            let _ = analyzer.run();
        }
    }
});
