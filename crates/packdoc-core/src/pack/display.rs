use crate::pack::{Pack, PackSchema};
use std::fmt;

///
/// Diagnostics
///
/// Renders every declared member as a label/value table. Containers are
/// rendered from the stored mapping so nothing is materialized.
///

impl<S: PackSchema> fmt::Display for Pack<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pack({})", S::PATH)?;
        if let Some(key) = self.collection_key() {
            write!(f, "[{key}]")?;
        }
        writeln!(f)?;

        let members = S::schema().members();
        let width = members.iter().map(|m| m.label.len()).max().unwrap_or(0);

        for member in members {
            writeln!(
                f,
                "  {:<width$}  {}",
                member.label,
                member.decl.render(self),
            )?;
        }

        Ok(())
    }
}

impl<S: PackSchema> fmt::Debug for Pack<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for member in S::schema().members() {
            map.entry(&member.label, &format_args!("{}", member.decl.render(self)));
        }

        map.finish()
    }
}
