use contracts::domain::a004_despacho::aggregate::{DespachoCompleto, DespachoConDocumentos};
use contracts::domain::a004_despacho::ingest::{
    DespachoEntrada, DespachoInput, DocumentoInput, ModoIngesta, ResumenIngesta,
};
use contracts::shared::pagination::Paginated;
use contracts::shared::query::{DespachoKeyQuery, DespachoSearchQuery};
use sea_orm::{DatabaseConnection, DbErr};

use super::repository;
use crate::shared::error::{is_unique_violation, ApiError, FieldError};
use crate::shared::query::{filters, shape};

/// Tamaño de lote de la ingesta. El orden de los lotes es el orden de
/// confirmación.
pub const BATCH_SIZE: usize = 500;

pub async fn listar(
    conn: &DatabaseConnection,
    query: &DespachoSearchQuery,
) -> Result<Paginated<DespachoConDocumentos>, ApiError> {
    let filter = filters::validate_despachos(query)?;
    let (data, total) = repository::list(conn, &filter).await?;
    Ok(Paginated {
        data,
        meta: shape::page_meta(total, filter.page.page, filter.page.limit),
    })
}

/// Cabecera y detalle en paralelo; sin cabecera no hay despacho, y el
/// detalle se descarta aunque existiera.
pub async fn despacho_completo(
    conn: &DatabaseConnection,
    query: &DespachoKeyQuery,
) -> Result<Option<DespachoCompleto>, ApiError> {
    let num_despacho = filters::validate_despacho_key(query)?;
    let (cabecera, detalle) = tokio::try_join!(
        repository::get_header(conn, &num_despacho),
        repository::get_lineas(conn, &num_despacho),
    )?;
    Ok(cabecera.map(|cabecera| DespachoCompleto { cabecera, detalle }))
}

/// Resultado terminal de la tubería de lotes. El éxito parcial es un
/// resultado de primera clase: `Failed` conserva cuántos registros quedaron
/// confirmados y en qué lote (base cero) se detuvo todo.
#[derive(Debug)]
pub(crate) enum IngestOutcome {
    Completed { total: u64 },
    Failed {
        procesados: u64,
        lote: usize,
        causa: DbErr,
    },
}

/// Procesa la entrada completa: valida todo antes de escribir nada, parte
/// en lotes de `BATCH_SIZE` y se detiene en el primer lote que falla. Los
/// lotes ya confirmados no se revierten.
pub async fn procesar_despachos(
    conn: &DatabaseConnection,
    entrada: DespachoEntrada,
) -> Result<ResumenIngesta, ApiError> {
    let mut registros = entrada.into_lista();
    validar_registros(&mut registros)?;

    let mode = if registros.len() > 1 {
        ModoIngesta::Bulk
    } else {
        ModoIngesta::Single
    };

    match ejecutar_lotes(conn, &registros).await {
        IngestOutcome::Completed { total } => Ok(ResumenIngesta {
            success: true,
            total,
            mode,
        }),
        // con un solo registro no hay estado parcial que comunicar
        IngestOutcome::Failed { causa, .. }
            if mode == ModoIngesta::Single && is_unique_violation(&causa) =>
        {
            Err(ApiError::Conflict(
                "El despacho ya existe en la base de datos.".to_string(),
            ))
        }
        IngestOutcome::Failed {
            procesados,
            lote,
            causa,
        } => Err(ApiError::BatchFailed {
            procesados,
            lote,
            causa,
        }),
    }
}

pub(crate) async fn ejecutar_lotes(
    conn: &DatabaseConnection,
    registros: &[DespachoInput],
) -> IngestOutcome {
    let mut procesados: u64 = 0;

    for (lote, chunk) in registros.chunks(BATCH_SIZE).enumerate() {
        match repository::insert_chunk(conn, chunk).await {
            Ok(()) => {
                procesados += chunk.len() as u64;
                tracing::info!("Procesados {procesados} de {}", registros.len());
            }
            Err(causa) => {
                // parada inmediata: los lotes restantes no se intentan
                return IngestOutcome::Failed {
                    procesados,
                    lote,
                    causa,
                };
            }
        }
    }

    IngestOutcome::Completed { total: procesados }
}

/// Validación todo-o-nada de la entrada completa: un solo registro
/// malformado rechaza el envío entero, con los errores de todos los
/// registros enumerados. Canonicaliza `despachado` a mayúsculas.
fn validar_registros(registros: &mut [DespachoInput]) -> Result<(), ApiError> {
    let mut errors = Vec::new();

    if registros.is_empty() {
        errors.push(FieldError::new("despachos", "debe contener al menos un registro"));
    }

    for (i, registro) in registros.iter_mut().enumerate() {
        let requeridos = [
            ("numDespacho", &registro.num_despacho),
            ("ruta", &registro.ruta),
            ("transportista", &registro.transportista),
            ("nif20", &registro.nif20),
            ("unidad", &registro.unidad),
            ("placa1", &registro.placa1),
            ("trasbordo", &registro.trasbordo),
            ("placa2", &registro.placa2),
            ("rutero", &registro.rutero),
        ];
        for (campo, valor) in requeridos {
            if valor.trim().is_empty() {
                errors.push(FieldError::new(format!("[{i}].{campo}"), "es obligatorio"));
            }
        }

        match registro.despachado.trim().to_uppercase().as_str() {
            "S" => registro.despachado = "S".to_string(),
            "N" => registro.despachado = "N".to_string(),
            _ => errors.push(FieldError::new(
                format!("[{i}].despachado"),
                "debe ser 'S' o 'N'",
            )),
        }

        if registro.documentos.is_empty() {
            errors.push(FieldError::new(
                format!("[{i}].documentos"),
                "debe contener al menos un documento",
            ));
        }

        for (j, doc) in registro.documentos.iter().enumerate() {
            validar_documento(i, j, doc, &mut errors);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

fn validar_documento(i: usize, j: usize, doc: &DocumentoInput, errors: &mut Vec<FieldError>) {
    let requeridos = [
        ("serieDoc", &doc.serie_doc),
        ("numDoc", &doc.num_doc),
        ("tipoDoc", &doc.tipo_doc),
    ];
    for (campo, valor) in requeridos {
        if valor.trim().is_empty() {
            errors.push(FieldError::new(
                format!("[{i}].documentos[{j}].{campo}"),
                "es obligatorio",
            ));
        }
    }
    if doc.cod_cliente.is_none() {
        errors.push(FieldError::new(
            format!("[{i}].documentos[{j}].codCliente"),
            "es obligatorio",
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::connect_memory;
    use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

    fn documento(num_doc: &str, cod_cliente: i64) -> DocumentoInput {
        DocumentoInput {
            serie_doc: "FA".to_string(),
            num_doc: num_doc.to_string(),
            tipo_doc: "FACTURA".to_string(),
            id_pedido: format!("PED-{num_doc}"),
            cod_cliente: Some(cod_cliente),
        }
    }

    fn registro(num_despacho: &str) -> DespachoInput {
        DespachoInput {
            num_despacho: num_despacho.to_string(),
            ruta: "R01".to_string(),
            transportista: "Transportes Vega".to_string(),
            nif20: "B99999999".to_string(),
            unidad: "U-7".to_string(),
            placa1: "ABC-123".to_string(),
            trasbordo: "N".to_string(),
            placa2: "XYZ-789".to_string(),
            despachado: "n".to_string(),
            rutero: "Chofer Perez".to_string(),
            documentos: vec![documento(&format!("F-{num_despacho}"), 42)],
        }
    }

    async fn count_rows(conn: &DatabaseConnection, table: &str) -> i64 {
        conn.query_one(Statement::from_string(
            DatabaseBackend::Sqlite,
            format!("SELECT COUNT(*) AS total FROM {table}"),
        ))
        .await
        .unwrap()
        .unwrap()
        .try_get("", "total")
        .unwrap()
    }

    #[tokio::test]
    async fn test_roundtrip_single() {
        let conn = connect_memory().await;

        let resumen = procesar_despachos(
            &conn,
            DespachoEntrada::Unico(Box::new(registro("D-0001"))),
        )
        .await
        .unwrap();
        assert_eq!(resumen.total, 1);
        assert_eq!(resumen.mode, ModoIngesta::Single);
        assert!(resumen.success);

        let completo = despacho_completo(
            &conn,
            &DespachoKeyQuery {
                num_despacho: Some("D-0001".to_string()),
            },
        )
        .await
        .unwrap()
        .unwrap();

        let enviado = registro("D-0001");
        assert_eq!(completo.cabecera.num_despacho, enviado.num_despacho);
        assert_eq!(completo.cabecera.ruta, enviado.ruta);
        assert_eq!(completo.cabecera.transportista, enviado.transportista);
        assert_eq!(completo.cabecera.placa2, enviado.placa2);
        // canonicalizado en la validación
        assert_eq!(completo.cabecera.despachado, "N");
        // asignada por el servidor
        assert!(!completo.cabecera.fecha_creacion.is_empty());

        assert_eq!(completo.detalle.len(), 1);
        assert_eq!(completo.detalle[0].num_doc, "F-D-0001");
        assert_eq!(completo.detalle[0].cod_cliente, 42);
        assert_eq!(completo.detalle[0].id_pedido, "PED-F-D-0001");
    }

    #[tokio::test]
    async fn test_bulk_mode_and_listing_with_documents() {
        let conn = connect_memory().await;

        let lote: Vec<_> = (1..=3).map(|i| registro(&format!("D-{i:04}"))).collect();
        let resumen = procesar_despachos(&conn, DespachoEntrada::Lote(lote))
            .await
            .unwrap();
        assert_eq!(resumen.total, 3);
        assert_eq!(resumen.mode, ModoIngesta::Bulk);

        let page = listar(&conn, &DespachoSearchQuery::default()).await.unwrap();
        assert_eq!(page.meta.total, 3);
        assert_eq!(page.data.len(), 3);
        // cada fila trae sus documentos reagrupados desde la columna JSON
        for fila in &page.data {
            assert_eq!(fila.documentos.len(), 1);
            assert_eq!(fila.documentos[0].serie_doc, "FA");
        }
    }

    #[tokio::test]
    async fn test_partial_failure_reports_chunk_and_committed_count() {
        let conn = connect_memory().await;

        // 1200 registros: dos lotes completos y uno parcial. El duplicado
        // cae dentro del tercer lote (índice 2).
        let mut registros: Vec<_> = (0..1200).map(|i| registro(&format!("D-{i:05}"))).collect();
        registros[1100].num_despacho = "D-00007".to_string();
        for registro in registros.iter_mut() {
            registro.despachado = "S".to_string();
        }

        let outcome = ejecutar_lotes(&conn, &registros).await;
        match outcome {
            IngestOutcome::Failed {
                procesados,
                lote,
                causa,
            } => {
                assert_eq!(procesados, 1000);
                assert_eq!(lote, 2);
                assert!(crate::shared::error::is_unique_violation(&causa));
            }
            other => panic!("se esperaba Failed, llegó {other:?}"),
        }

        // los dos lotes confirmados persisten; el lote fallido se revirtió entero
        assert_eq!(count_rows(&conn, "cab_despachos").await, 1000);
        assert_eq!(count_rows(&conn, "det_despachos").await, 1000);
    }

    #[tokio::test]
    async fn test_validation_is_all_or_nothing() {
        let conn = connect_memory().await;

        let mut malo = registro("D-0002");
        malo.ruta = String::new();
        let lote = vec![registro("D-0001"), malo];

        let err = procesar_despachos(&conn, DespachoEntrada::Lote(lote))
            .await
            .unwrap_err();
        match err {
            ApiError::Validation(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "[1].ruta");
            }
            other => panic!("se esperaba Validation, llegó {other:?}"),
        }

        // nada llegó a escribirse
        assert_eq!(count_rows(&conn, "cab_despachos").await, 0);
    }

    #[tokio::test]
    async fn test_validation_enumerates_every_field_of_every_record() {
        let mut r0 = registro("D-0001");
        r0.placa1 = String::new();
        r0.despachado = "quizas".to_string();
        let mut r1 = registro("D-0002");
        r1.documentos.clear();
        let mut r2 = registro("D-0003");
        r2.documentos[0].cod_cliente = None;
        r2.documentos[0].num_doc = "  ".to_string();

        let mut registros = vec![r0, r1, r2];
        let err = validar_registros(&mut registros).unwrap_err();
        let fields: Vec<String> = match err {
            ApiError::Validation(errors) => errors.into_iter().map(|e| e.field).collect(),
            other => panic!("se esperaba Validation, llegó {other:?}"),
        };

        for esperado in [
            "[0].placa1",
            "[0].despachado",
            "[1].documentos",
            "[2].documentos[0].numDoc",
            "[2].documentos[0].codCliente",
        ] {
            assert!(fields.iter().any(|f| f == esperado), "falta {esperado}: {fields:?}");
        }
    }

    #[tokio::test]
    async fn test_duplicate_single_record_is_a_conflict() {
        let conn = connect_memory().await;

        procesar_despachos(&conn, DespachoEntrada::Unico(Box::new(registro("D-0001"))))
            .await
            .unwrap();
        let err = procesar_despachos(&conn, DespachoEntrada::Unico(Box::new(registro("D-0001"))))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_empty_submission_is_rejected() {
        let conn = connect_memory().await;
        let err = procesar_despachos(&conn, DespachoEntrada::Lote(Vec::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn test_line_filters_deduplicate_headers() {
        let conn = connect_memory().await;

        // un despacho con dos documentos del mismo cliente: el JOIN con las
        // líneas no debe duplicar la cabecera ni inflar el total
        let mut con_dos = registro("D-0001");
        con_dos.documentos = vec![documento("F-1", 42), documento("F-2", 42)];
        let otro = registro("D-0002");

        procesar_despachos(&conn, DespachoEntrada::Lote(vec![con_dos, otro]))
            .await
            .unwrap();

        let mut query = DespachoSearchQuery::default();
        query.cod_cliente = Some("42".to_string());
        let page = listar(&conn, &query).await.unwrap();
        assert_eq!(page.meta.total, 2);
        assert_eq!(page.data.len(), 2);

        let mut query = DespachoSearchQuery::default();
        query.num_doc = Some("F-1".to_string());
        let page = listar(&conn, &query).await.unwrap();
        assert_eq!(page.meta.total, 1);
        assert_eq!(page.data[0].cabecera.num_despacho, "D-0001");
        // la fila conserva su colección completa de documentos
        assert_eq!(page.data[0].documentos.len(), 2);
    }

    #[tokio::test]
    async fn test_header_filters_and_free_text() {
        let conn = connect_memory().await;

        let mut a = registro("D-0001");
        a.ruta = "R01".to_string();
        a.despachado = "S".to_string();
        let mut b = registro("D-0002");
        b.ruta = "R02".to_string();
        b.placa1 = "KLM-456".to_string();

        procesar_despachos(&conn, DespachoEntrada::Lote(vec![a, b]))
            .await
            .unwrap();

        let mut query = DespachoSearchQuery::default();
        query.ruta = Some("R01".to_string());
        assert_eq!(listar(&conn, &query).await.unwrap().meta.total, 1);

        let mut query = DespachoSearchQuery::default();
        query.estado = Some("s".to_string());
        assert_eq!(listar(&conn, &query).await.unwrap().meta.total, 1);

        // término libre sobre la placa, sin distinguir mayúsculas
        let mut query = DespachoSearchQuery::default();
        query.termino = Some("klm".to_string());
        let page = listar(&conn, &query).await.unwrap();
        assert_eq!(page.meta.total, 1);
        assert_eq!(page.data[0].cabecera.num_despacho, "D-0002");

        // término en blanco equivale a no filtrar
        let mut query = DespachoSearchQuery::default();
        query.termino = Some("   ".to_string());
        assert_eq!(listar(&conn, &query).await.unwrap().meta.total, 2);
    }

    #[tokio::test]
    async fn test_lookup_absent_is_none() {
        let conn = connect_memory().await;
        let ausente = despacho_completo(
            &conn,
            &DespachoKeyQuery {
                num_despacho: Some("NO-EXISTE".to_string()),
            },
        )
        .await
        .unwrap();
        assert!(ausente.is_none());
    }
}
