mod helpers;
mod writer_tests;
