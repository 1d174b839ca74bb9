pub mod csv_io;
