pub mod puzzle_set;
