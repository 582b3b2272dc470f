pub mod ldl_tridiag;
