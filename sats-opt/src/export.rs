use sats_core::models::{LinearExpr, Mip, VarType};
use std::io::Write;

/// Write an assembled model in CPLEX LP format, for inspection or for
/// solving with an external tool.
pub fn export_lp(mip: &Mip, buffer: &mut impl Write) -> Result<(), std::io::Error> {
    // https://www.ibm.com/docs/en/icos/22.1.2?topic=cplex-lp-file-format-algebraic-representation
    // is a good reference. Names are restricted to a safe character set.
    let names: Vec<String> = mip.variables().map(|(_, v)| sanitize(&v.name)).collect();

    writeln!(buffer, "\\ spectrum auction allocation problem")?;
    writeln!(buffer, "Maximize")?;
    write!(buffer, " value:")?;
    write_expr(buffer, mip.objective(), &names)?;
    writeln!(buffer)?;

    writeln!(buffer, "Subject To")?;
    for (idx, constraint) in mip.constraints().iter().enumerate() {
        write!(buffer, " c{idx}:")?;
        write_expr(buffer, &constraint.expr, &names)?;
        writeln!(buffer, " {} {}", constraint.comparison, constraint.rhs)?;
    }

    writeln!(buffer, "Bounds")?;
    for ((_, variable), name) in mip.variables().zip(names.iter()) {
        if variable.var_type != VarType::Boolean {
            writeln!(buffer, " {} <= {name} <= {}", variable.lower, variable.upper)?;
        }
    }

    let integers = section(mip, &names, VarType::Integer);
    if !integers.is_empty() {
        writeln!(buffer, "General")?;
        writeln!(buffer, " {}", integers.join(" "))?;
    }
    let binaries = section(mip, &names, VarType::Boolean);
    if !binaries.is_empty() {
        writeln!(buffer, "Binary")?;
        writeln!(buffer, " {}", binaries.join(" "))?;
    }

    writeln!(buffer, "End")?;
    Ok(())
}

fn write_expr(
    buffer: &mut impl Write,
    expr: &LinearExpr,
    names: &[String],
) -> Result<(), std::io::Error> {
    if expr.is_empty() {
        // LP files do not allow an empty left-hand side
        return write!(buffer, " 0 {}", names.first().map_or("x", String::as_str));
    }
    for (var, coefficient) in expr.terms() {
        let sign = if coefficient < 0.0 { '-' } else { '+' };
        write!(buffer, " {sign} {} {}", coefficient.abs(), names[var.index()])?;
    }
    Ok(())
}

fn section<'a>(mip: &Mip, names: &'a [String], var_type: VarType) -> Vec<&'a str> {
    mip.variables()
        .zip(names.iter())
        .filter(|((_, variable), _)| variable.var_type == var_type)
        .map(|(_, name)| name.as_str())
        .collect()
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sats_core::models::{Constraint, Variable};

    #[test]
    fn writes_all_sections() {
        let mut mip = Mip::new();
        let x = mip
            .add_variable(Variable::integer("x_b0_r0_A B", 0.0, 2.0))
            .unwrap();
        let z = mip.add_variable(Variable::boolean("z")).unwrap();
        let v = mip
            .add_variable(Variable::continuous("v_b0", 0.0, 10.0))
            .unwrap();
        mip.add_constraint(Constraint::leq(
            [(1.0, x), (-2.0, z)].into_iter().collect(),
            1.0,
        ))
        .unwrap();
        mip.add_objective_term(1.0, v).unwrap();

        let mut buffer = Vec::new();
        export_lp(&mip, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert!(text.contains("Maximize\n value: + 1 v_b0\n"));
        assert!(text.contains(" c0: + 1 x_b0_r0_A_B - 2 z <= 1\n"));
        assert!(text.contains(" 0 <= v_b0 <= 10\n"));
        assert!(text.contains("General\n x_b0_r0_A_B\n"));
        assert!(text.contains("Binary\n z\n"));
        assert!(text.ends_with("End\n"));
    }
}
