//! Board identification from `/proc/cpuinfo`

use pinking_hal::BoardInfo;

/// Location of the kernel's CPU description
pub const CPUINFO_PATH: &str = "/proc/cpuinfo";

/// Read board info from the running system
pub fn read_board_info() -> Option<BoardInfo> {
    let text = std::fs::read_to_string(CPUINFO_PATH).ok()?;
    parse_cpuinfo(&text)
}

/// Extract the revision code and model name from cpuinfo text
///
/// Returns `None` if there is no `Revision` line.
pub fn parse_cpuinfo(text: &str) -> Option<BoardInfo> {
    let mut revision = None;
    let mut model = None;
    let mut hardware = None;

    for line in text.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "Revision" => revision = Some(value.to_ascii_lowercase()),
            "Model" => model = Some(value.to_string()),
            "Hardware" => hardware = Some(value.to_string()),
            _ => {}
        }
    }

    Some(BoardInfo {
        revision: revision?,
        model: model
            .or(hardware)
            .unwrap_or_else(|| "unknown".to_string()),
    })
}
