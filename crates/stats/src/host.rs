//! Process and host memory usage for the stats query surface.

use {serde::Serialize, sysinfo::System};

const MIB: f64 = 1024.0 * 1024.0;

/// One memory reading, scaled for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryUsage {
    /// Amount in `unit`, two decimals.
    pub raw_value: String,
    /// Share of total host memory, two decimals.
    pub percentage: String,
    /// `MB`, or `GB` above 1024 MB.
    pub unit: &'static str,
}

impl MemoryUsage {
    pub fn from_bytes(used: u64, total: u64) -> Self {
        let mb = used as f64 / MIB;
        let (value, unit) = if mb > 1024.0 {
            (mb / 1024.0, "GB")
        } else {
            (mb, "MB")
        };
        let percentage = if total == 0 {
            0.0
        } else {
            used as f64 / total as f64 * 100.0
        };
        Self {
            raw_value: format!("{value:.2}"),
            percentage: format!("{percentage:.2}"),
            unit,
        }
    }
}

/// Memory used by this process and by the host as a whole.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostUsage {
    pub bot_only: MemoryUsage,
    pub global: MemoryUsage,
}

impl HostUsage {
    /// Take a point-in-time reading.
    pub fn collect() -> Self {
        let mut sys = System::new();
        sys.refresh_memory();
        let pid = sysinfo::get_current_pid().ok();
        if let Some(pid) = pid {
            sys.refresh_processes_specifics(
                sysinfo::ProcessesToUpdate::Some(&[pid]),
                false,
                sysinfo::ProcessRefreshKind::nothing().with_memory(),
            );
        }
        let process = pid
            .and_then(|p| sys.process(p))
            .map(|p| p.memory())
            .unwrap_or(0);
        let total = sys.total_memory();
        // available_memory() is 0 on some platforms; fall back to used.
        let used = match sys.available_memory() {
            0 => sys.used_memory(),
            available => total.saturating_sub(available),
        };

        #[cfg(feature = "metrics")]
        herald_metrics::gauge!(herald_metrics::system::PROCESS_MEMORY_BYTES).set(process as f64);

        Self {
            bot_only: MemoryUsage::from_bytes(process, total),
            global: MemoryUsage::from_bytes(used, total),
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    #[rstest]
    #[case(512 * 1024 * 1024, 4096 * 1024 * 1024, "512.00", "MB", "12.50")]
    #[case(1024 * 1024 * 1024, 4096 * 1024 * 1024, "1024.00", "MB", "25.00")]
    #[case(3 * 1024 * 1024 * 1024, 4096 * 1024 * 1024, "3.00", "GB", "75.00")]
    #[case(0, 0, "0.00", "MB", "0.00")]
    fn scales_and_formats(
        #[case] used: u64,
        #[case] total: u64,
        #[case] raw: &str,
        #[case] unit: &str,
        #[case] pct: &str,
    ) {
        let usage = MemoryUsage::from_bytes(used, total);
        assert_eq!(usage.raw_value, raw);
        assert_eq!(usage.unit, unit);
        assert_eq!(usage.percentage, pct);
    }

    #[test]
    fn collect_reads_host_memory() {
        let usage = HostUsage::collect();
        let json = serde_json::to_value(&usage).unwrap();
        assert!(json["botOnly"]["rawValue"].is_string());
        assert!(json["global"]["unit"].is_string());
    }
}
