pub mod a001_factura;
pub mod a002_albaran;
pub mod a003_cliente;
pub mod a004_despacho;
