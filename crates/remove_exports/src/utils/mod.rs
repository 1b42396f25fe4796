#[cfg(test)]
pub(crate) mod test_helper;
