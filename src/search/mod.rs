//! Search procedures for the equitable coloring problem.

/// incremental solution state (colors, conflicts, equity bookkeeping)
pub mod state;

/// TabuEQCol local search at a fixed number of colors
pub mod tabu_eqcol;

/// descent controller lowering the number of colors one by one
pub mod descent;
