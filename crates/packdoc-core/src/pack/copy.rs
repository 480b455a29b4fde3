use crate::{
    error::PackError,
    pack::{Pack, PackSchema},
};

impl<S: PackSchema> Pack<S> {
    /// Copy every declared member into `dest`, going through the normal
    /// field `set` path so values are re-validated. Nested single and keyed
    /// containers are copied recursively; destination entries are created
    /// by key as needed.
    ///
    /// Not atomic: a failure part way leaves earlier members copied.
    pub fn copy_to(&self, dest: &Self) -> Result<(), PackError> {
        for member in S::schema().members() {
            member.decl.copy_member(self, dest)?;
        }

        Ok(())
    }
}
