use std::path::Path;

use color_eyre::eyre::Result;
use colored::Colorize;
use itertools::Itertools;
use itertools::iproduct;
use ldt_cost::prelude::*;
use ldt_cost::soundness::StirSoundnessTrace;
use ldt_cost::utils::bits_to_kib;
use rayon::prelude::*;
use tracing::info;

use crate::args::LowDegreeTestKind;
use crate::config::ExperimentConfig;

pub(crate) fn simulate(
    config: &ExperimentConfig,
    kind: LowDegreeTestKind,
    aurora: bool,
    json: bool,
    out: Option<&Path>,
) -> Result<()> {
    let low_degree_test: Box<dyn LowDegreeTest> = match kind {
        LowDegreeTestKind::Fri => Box::new(config.fri()?),
        LowDegreeTestKind::Stir => Box::new(config.stir()?),
    };
    info!("{}", config.parameters);
    let protocol = if aurora {
        aurora::simulate(low_degree_test.as_ref(), config.parameters, config.aurora)?
    } else {
        low_degree_test.simulate(config.parameters)?
    };

    if !json {
        print!("{protocol}");
        return Ok(());
    }

    let report = serde_json::to_string_pretty(&protocol.report())?;
    match out {
        Some(path) => {
            fs_err::write(path, report)?;
            info!("Report written to {}", path.display());
        }
        None => println!("{report}"),
    }

    Ok(())
}

pub(crate) fn compare(config: &ExperimentConfig) -> Result<()> {
    let fri_protocol = config.fri()?.simulate(config.parameters)?;
    let stir_protocol = config.stir()?.simulate(config.parameters)?;

    println!("{}", config.parameters);
    for (name, protocol) in [("FRI", &fri_protocol), ("STIR", &stir_protocol)] {
        println!(
            "{:<4}  rounds: {:>2}  arg size: {:>10}  proof length: {:>10}  queries: {:>4}",
            name.bold(),
            protocol.rounds().len(),
            format_size(protocol.argument_size()),
            protocol.proof_length(),
            protocol.queries(),
        );
    }

    let ratio = size_ratio(stir_protocol.argument_size(), fri_protocol.argument_size());
    println!("STIR / FRI: {ratio:.2}");

    Ok(())
}

/// One cell of the Aurora-FRI vs. Aurora-STIR comparison. Sizes are in bits.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub(crate) struct TableCell {
    pub log2_inverse_rate: usize,
    pub log2_degree: usize,
    pub fri_size: usize,
    pub stir_size: usize,
}

impl TableCell {
    pub fn ratio(&self) -> f64 {
        size_ratio(self.stir_size, self.fri_size)
    }
}

pub(crate) fn table_cells(
    config: &ExperimentConfig,
    log2_inverse_rates: &[usize],
    log2_degrees: &[usize],
) -> Result<Vec<TableCell>> {
    let table = &config.table;
    let fri = Fri::new(table.fri_folding_factors.clone(), table.stopping_degree)?;
    let stir = Stir::new(
        table.stir_folding_factors.clone(),
        table.domain_shrinkage.clone(),
        table.stopping_degree,
    )?;

    let cells = iproduct!(log2_inverse_rates, log2_degrees)
        .collect_vec()
        .into_par_iter()
        .map(|(&log2_inverse_rate, &log2_degree)| {
            let params = LdtParameters {
                log2_inverse_rate,
                log2_degree,
                ..config.parameters
            };
            let fri_protocol = aurora::simulate(&fri, params, config.aurora)?;
            let stir_protocol = aurora::simulate(&stir, params, config.aurora)?;

            Ok(TableCell {
                log2_inverse_rate,
                log2_degree,
                fri_size: fri_protocol.argument_size(),
                stir_size: stir_protocol.argument_size(),
            })
        })
        .collect::<Result<Vec<_>, ProtocolError>>()?;

    Ok(cells)
}

pub(crate) fn table(
    config: &ExperimentConfig,
    log2_inverse_rates: Option<&[usize]>,
    log2_degrees: Option<&[usize]>,
) -> Result<()> {
    let log2_inverse_rates = log2_inverse_rates.unwrap_or(&config.table.log2_inverse_rates);
    let log2_degrees = log2_degrees.unwrap_or(&config.table.log2_degrees);
    let cells = table_cells(config, log2_inverse_rates, log2_degrees)?;

    println!("Aurora-FRI / Aurora-STIR argument sizes in KiB");
    let header = log2_degrees
        .iter()
        .map(|log2_degree| format!("{:>18}", format!("2^{log2_degree}")))
        .join("");
    println!("{:<8}{}", "rate", header.bold());

    let rows = cells.iter().chunk_by(|cell| cell.log2_inverse_rate);
    for (log2_inverse_rate, row) in &rows {
        let rendered_row = row
            .map(|cell| {
                let sizes = format!(
                    "{} / {} ({:.2})",
                    bits_to_kib(cell.fri_size),
                    bits_to_kib(cell.stir_size),
                    cell.ratio(),
                );
                format!("{sizes:>18}")
            })
            .join("");
        let rate = format!("1/{}", 1_u64 << log2_inverse_rate);
        println!("{:<8}{rendered_row}", rate.bold());
    }

    Ok(())
}

pub(crate) fn soundness(config: &ExperimentConfig) -> Result<()> {
    let trace = StirSoundnessTrace::new(&config.soundness)?;
    print!("{trace}");
    println!("Weakest link: {:.2} bits", trace.weakest_link_bits());

    Ok(())
}

fn size_ratio(numerator: usize, denominator: usize) -> f64 {
    numerator as f64 / denominator as f64
}

#[cfg(test)]
mod tests {
    use assert2::assert;
    use assert2::let_assert;

    use super::*;

    #[test]
    fn table_cell_for_default_parameters_has_expected_sizes() {
        let config = ExperimentConfig::default();
        let_assert!(Ok(cells) = table_cells(&config, &[2], &[18]));
        let_assert!([cell] = cells.as_slice());
        assert!(1_188_864 == cell.fri_size);
        assert!(832_064 == cell.stir_size);
        assert!(145 == bits_to_kib(cell.fri_size));
        assert!(102 == bits_to_kib(cell.stir_size));
        assert!(cell.ratio() < 1.0);
    }

    #[test]
    fn table_cells_are_ordered_by_rate_then_degree() {
        let config = ExperimentConfig::default();
        let_assert!(Ok(cells) = table_cells(&config, &[1, 3], &[18, 20]));
        let coordinates = cells
            .iter()
            .map(|cell| (cell.log2_inverse_rate, cell.log2_degree))
            .collect_vec();
        assert!(vec![(1, 18), (1, 20), (3, 18), (3, 20)] == coordinates);
    }

    #[test]
    fn table_fails_for_invalid_rate() {
        let config = ExperimentConfig::default();
        let_assert!(Err(_) = table_cells(&config, &[0], &[18]));
    }

    #[test]
    fn simulation_report_can_be_written_to_file() {
        let config = ExperimentConfig::default();
        let path = std::env::temp_dir().join("ldt-cost-test-report.json");
        let result = simulate(&config, LowDegreeTestKind::Stir, false, true, Some(path.as_path()));
        let_assert!(Ok(()) = result);

        let_assert!(Ok(report) = fs_err::read_to_string(&path));
        let_assert!(Ok(()) = fs_err::remove_file(&path));
        let_assert!(Ok(report) = serde_json::from_str::<ProtocolReport>(&report));
        assert!(552_256 == report.argument_size);
    }

    #[test]
    fn default_soundness_trace_can_be_printed() {
        let_assert!(Ok(()) = soundness(&ExperimentConfig::default()));
    }
}
