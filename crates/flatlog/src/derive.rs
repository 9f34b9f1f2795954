//! Columns computed from a decoded table, and name-based column discovery.

use std::collections::BTreeSet;
use tracing::warn;

use crate::table::{Column, LogTable};

/// Marker that force-sensor columns carry in their names, e.g.
/// `RightFootForceSensor_fx`.
const FORCE_SENSOR_MARKER: &str = "ForceSensor";

impl LogTable {
    /// Computes the per-joint columns the log viewer plots next to the raw
    /// encoder and command data.
    ///
    /// For `i = 0, 1, ...` while numeric `qIn_{i}` and `qOut_{i}` both exist:
    ///
    /// - `error_{i} = qOut_{i} - qIn_{i}`
    /// - `qIn_limits_lower_{i}`, `qIn_limits_upper_{i}`,
    ///   `qOut_limits_lower_{i}`, `qOut_limits_upper_{i}`: zeros
    ///
    /// and for `i = 0, 1, ...` while numeric `tauIn_{i}` exists,
    /// `tauIn_limits_lower_{i}` and `tauIn_limits_upper_{i}`: zeros.
    ///
    /// Both scans stop at the first missing index. A joint whose `qIn` and
    /// `qOut` lengths differ (possible with the length check disabled) gets
    /// no columns. Returned in the order above; names may collide with
    /// columns already in the table.
    #[must_use]
    pub fn joint_derivations(&self) -> Vec<(String, Column)> {
        let mut derived = Vec::new();

        for i in 0.. {
            let (Some(q_in), Some(q_out)) = (
                self.numeric(&format!("qIn_{}", i)),
                self.numeric(&format!("qOut_{}", i)),
            ) else {
                break;
            };
            if q_in.len() != q_out.len() {
                warn!(
                    joint = i,
                    q_in = q_in.len(),
                    q_out = q_out.len(),
                    "encoder and command lengths differ, skipping joint"
                );
                continue;
            }

            let error = q_out.iter().zip(q_in).map(|(out, inp)| out - inp).collect();
            let zeros = vec![0.0; q_in.len()];

            derived.push((format!("error_{}", i), Column::Numeric(error)));
            for name in ["qIn_limits_lower", "qIn_limits_upper"] {
                derived.push((format!("{}_{}", name, i), Column::Numeric(zeros.clone())));
            }
            // Command limits mirror the encoder limits.
            for name in ["qOut_limits_lower", "qOut_limits_upper"] {
                derived.push((format!("{}_{}", name, i), Column::Numeric(zeros.clone())));
            }
        }

        for i in 0.. {
            let Some(tau) = self.numeric(&format!("tauIn_{}", i)) else {
                break;
            };
            for name in ["tauIn_limits_lower", "tauIn_limits_upper"] {
                derived.push((format!("{}_{}", name, i), Column::Numeric(vec![0.0; tau.len()])));
            }
        }

        derived
    }

    /// Returns the table with [`joint_derivations`](Self::joint_derivations)
    /// appended. Columns already present are kept as they are.
    #[must_use]
    pub fn with_joint_derivations(mut self) -> Self {
        for (name, column) in self.joint_derivations() {
            if !self.contains(&name) {
                self.push(name, column);
            }
        }
        self
    }

    /// Force sensors present in the log: the distinct name prefixes before
    /// `ForceSensor`, sorted.
    #[must_use]
    pub fn force_sensors(&self) -> Vec<String> {
        self.names()
            .filter_map(|name| name.find(FORCE_SENSOR_MARKER).map(|at| &name[..at]))
            .map(str::to_owned)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
