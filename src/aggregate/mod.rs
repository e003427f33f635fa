mod aggregator;
mod table;

pub use aggregator::{AggregationRow, Aggregator, DamageRow, GroupBy, GroupKey};
pub use table::{
    aggregation_to_dataframe, damage_to_dataframe, units_to_dataframe,
    write_aggregation_csv, write_damage_csv, write_units_csv,
};
