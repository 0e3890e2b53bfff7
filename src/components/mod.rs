pub mod jump_cell;
