use std::{
    fmt::{self, Display},
    fs,
    path::Path,
};

use log::debug;

use crate::{
    data::{write_separated, Decimal, ProblemSpec},
    error::{Error, Result},
};

/// DZN data file for one spec. Identifiers match the declarations in the model file.
pub struct Dzn<'a>(pub &'a ProblemSpec);

impl Display for Dzn<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let spec = self.0;
        let m = spec.m;

        comment(f, "item count")?;
        writeln!(f, "n = {};", spec.n)?;
        comment(f, "size of the index set 1..m")?;
        writeln!(f, "m = {m};")?;
        comment(f, "priority per index")?;
        write!(f, "pi = [")?;
        write_separated(f, &spec.priorities, ", ")?;
        writeln!(f, "];")?;
        comment(f, "value per index")?;
        write!(f, "vi = [")?;
        write_separated(f, spec.values.iter().map(|&x| Decimal(x)), ", ")?;
        writeln!(f, "];")?;
        comment(f, "ceiling per index")?;
        write!(f, "cei = [")?;
        write_separated(f, spec.ceilings.iter().map(|&x| Decimal(x)), ", ")?;
        writeln!(f, "];")?;

        comment(f, "cost matrix, row-major")?;
        writeln!(f, "ci = array2d(1..{m}, 1..{m}, [")?;
        for (i, row) in spec.cost_matrix.iter().enumerate() {
            f.write_str("    ")?;
            write_separated(f, row.iter().map(|&x| Decimal(x)), ", ")?;
            if i + 1 < spec.cost_matrix.len() {
                writeln!(f, ",")?
            } else {
                writeln!(f)?
            }
        }
        writeln!(f, "]);")?;

        comment(f, "cost threshold")?;
        writeln!(f, "ct = {};", Decimal(spec.cost_threshold))?;
        comment(f, "maximum count")?;
        writeln!(f, "maxM = {};", spec.max_count)
    }
}

#[cfg(feature = "commented-dzn")]
fn comment(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    writeln!(f, "% {text}")
}

#[cfg(not(feature = "commented-dzn"))]
fn comment(_: &mut fmt::Formatter<'_>, _: &str) -> fmt::Result {
    Ok(())
}

/// Writes the DZN rendering of `spec` to `path`. Specs that fail validation are
/// refused before the file is touched, and a failed write leaves no file behind.
pub fn write_dzn(spec: &ProblemSpec, path: &Path) -> Result<()> {
    spec.validate().map_err(Error::InvalidSpec)?;
    let text = Dzn(spec).to_string();
    debug!("writing {} bytes to {}", text.len(), path.display());
    fs::write(path, text).map_err(|source| {
        let _ = fs::remove_file(path);
        Error::Emit {
            path: path.to_owned(),
            source,
        }
    })
}
