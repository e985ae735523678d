//! Print pointer response tables.

use blinkmouse_analyzer::response_curve::{MAX_ACCELERATION_LEVEL, TABLE_LEN};
use blinkmouse_analyzer::ResponseTable;

pub fn run(level: Option<u8>) -> anyhow::Result<()> {
    let levels: Vec<u8> = match level {
        Some(level) if level > MAX_ACCELERATION_LEVEL => {
            anyhow::bail!("Acceleration level must be 0-{MAX_ACCELERATION_LEVEL}, got {level}")
        }
        Some(level) => vec![level],
        None => (0..=MAX_ACCELERATION_LEVEL).collect(),
    };

    let header: Vec<String> = (0..TABLE_LEN).map(|i| format!("{i:>5}")).collect();
    println!("level  {}", header.join(" "));

    for level in levels {
        let table = ResponseTable::for_level(level);
        let row: Vec<String> = table
            .multipliers()
            .iter()
            .map(|m| format!("{m:>5.2}"))
            .collect();
        let note = if table.is_linear() { "  (off)" } else { "" };
        println!("{level:>5}  {}{note}", row.join(" "));
    }

    Ok(())
}
