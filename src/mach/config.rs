/// ## Machine limits
///
/// Sizes of the store regions and of the loader tables.
/// The defaults are the classic P2 values.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Highest address of the stack region.
    pub stack_size: usize,
    pub integer_pool: usize,
    pub real_pool: usize,
    pub set_pool: usize,
    /// Slots, two per boundary pair.
    pub boundary_pool: usize,
    pub multiple_pool: usize,
    pub code_size: usize,
    pub max_label: usize,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            stack_size: 13650,
            integer_pool: 5,
            real_pool: 5,
            set_pool: 70,
            boundary_pool: 4,
            multiple_pool: 1300,
            code_size: 15000,
            max_label: 1550,
        }
    }
}
