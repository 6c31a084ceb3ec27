use crate::error::{Error, Result};
use crate::schema::{Attribute, Block};

/// Looks up the attribute a path points at.
///
/// All segments but the last walk nested blocks; the last one has to name an
/// attribute of the block reached that way.
pub fn resolve<'a, S: AsRef<str>>(root: &'a Block, path: &[S]) -> Result<&'a Attribute> {
    let Some((last, parents)) = path.split_last() else {
        return Err(Error::NotFound("empty path".to_string()));
    };

    let mut block = root;
    for segment in parents {
        block = block
            .block_types
            .get(segment.as_ref())
            .map(|nested| &nested.block)
            .ok_or_else(|| not_found(path))?;
    }

    block.attributes.get(last.as_ref()).ok_or_else(|| not_found(path))
}

fn not_found<S: AsRef<str>>(path: &[S]) -> Error {
    let joined: Vec<&str> = path.iter().map(AsRef::as_ref).collect();
    Error::NotFound(joined.join("."))
}
