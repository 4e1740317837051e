use crate::libs::config::Params;
use crate::libs::error::NetError;
use crate::libs::expr::ExprSet;
use crate::libs::graph::GeneGraph;
use itertools::Itertools;
use std::io::{BufRead, Write};

/// Writes the `>` header lines describing the run.
pub fn write_header<W: Write>(writer: &mut W, params: &Params) -> Result<(), NetError> {
    writeln!(writer, ">  Input file      {}", params.infile)?;
    writeln!(
        writer,
        ">  MI threshold    {}",
        crate::format_g(params.threshold, 6)
    )?;
    writeln!(writer, ">  MI P-value      {}", crate::format_g(params.pvalue, 6))?;
    writeln!(writer, ">  DPI tolerance   {}", crate::format_g(params.eps, 6))?;
    writeln!(
        writer,
        ">  Subnetwork file {}",
        params.subnet_file.as_deref().unwrap_or("")
    )?;
    Ok(())
}

/// Formats the line of one gene, or `None` when it is not written.
///
/// A gene without edges is written only with `write_empty`, and only when it
/// is active or the control. Indirect edges appear only with `write_reduced`,
/// as `neighbor.intermediate`.
pub fn gene_line(
    data: &ExprSet,
    graph: &GeneGraph,
    id: usize,
    write_reduced: bool,
    write_empty: bool,
) -> Option<String> {
    let marker = data.marker(id);
    let row = graph.neighbors(id).filter(|r| !r.is_empty());

    let row = match row {
        Some(row) => row,
        None if write_empty && (marker.active || marker.control) => {
            return Some(marker.accession.clone())
        }
        None => return None,
    };

    let fields = row
        .iter()
        .filter(|(_, e)| write_reduced || e.intermediate.is_none())
        .map(|(&j, e)| {
            let neighbor = match e.intermediate {
                Some(via) => format!("{}.{}", data.marker(j).accession, via),
                None => data.marker(j).accession.clone(),
            };
            format!("{}\t{}", neighbor, crate::format_g(e.mi, 6))
        });

    Some(std::iter::once(marker.accession.clone()).chain(fields).join("\t"))
}

/// Writes the header and the rows of `ids`, or of every gene when `ids` is
/// empty. Returns the number of gene lines.
pub fn write_adj<W: Write>(
    writer: &mut W,
    data: &ExprSet,
    graph: &GeneGraph,
    ids: &[usize],
    params: &Params,
) -> Result<usize, NetError> {
    write_header(writer, params)?;

    let all: Vec<usize>;
    let rows = if ids.is_empty() {
        all = (0..graph.len().min(data.num_markers())).collect();
        &all
    } else {
        ids
    };

    let mut lines = 0;
    for &id in rows {
        if let Some(line) = gene_line(data, graph, id, params.write_reduced, params.write_empty)
        {
            writeln!(writer, "{}", line)?;
            lines += 1;
        }
    }

    Ok(lines)
}

/// Loads an adjacency file into `graph`.
///
/// Entries below `threshold` are dropped, the rest are stored as written,
/// one way. Every gene heading a line becomes active again. Returns the
/// number of gene lines.
pub fn read_adj<R: BufRead>(
    reader: R,
    data: &mut ExprSet,
    threshold: f64,
    graph: &mut GeneGraph,
) -> Result<usize, NetError> {
    let mut lines = 0;

    for (i, line) in reader.lines().enumerate() {
        let line_no = i + 1;
        let line = line?;
        let line = line.trim_end_matches(&['\r', '\n'][..]);
        if line.starts_with('>') || line.trim().is_empty() {
            continue;
        }

        let mut fields = line.split('\t');
        let head = fields.next().unwrap_or("");
        let a = data
            .probe_id(head)
            .ok_or_else(|| NetError::UnknownMarker(head.to_string()))?;
        data.set_active(a, true);
        graph.ensure_capacity(a);

        for (neighbor, value) in fields.tuples() {
            let mi = value
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| {
                    NetError::format(line_no, format!("could not read MI '{}'", value))
                })?;
            if mi < threshold {
                continue;
            }

            let b = data
                .probe_id(neighbor)
                .ok_or_else(|| NetError::UnknownMarker(neighbor.to_string()))?;
            graph.set_edge(a, b, mi);
        }

        lines += 1;
    }

    log::info!(
        "Read {} gene lines, {} entries kept",
        lines,
        graph.num_entries()
    );

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> ExprSet {
        let text = "ID\tDesc\ts1\ts2\ts3\n\
                    A\ta\t1\t2\t3\n\
                    B\tb\t2\t3\t1\n\
                    C\tc\t3\t1\t2\n\
                    D\td\t1\t3\t2\n";
        ExprSet::from_reader(text.as_bytes()).unwrap()
    }

    fn triangle() -> GeneGraph {
        let mut graph = GeneGraph::with_capacity(4);
        graph.set_edge_symmetric(0, 1, 0.9);
        graph.set_edge_symmetric(1, 2, 0.8);
        graph.set_edge_symmetric(0, 2, 0.5);
        graph
    }

    fn params() -> Params {
        Params {
            infile: "expr.tsv".to_string(),
            eps: 0.1,
            ..Params::default()
        }
    }

    fn render(graph: &GeneGraph, ids: &[usize], params: &Params) -> String {
        let mut out = vec![];
        write_adj(&mut out, &data(), graph, ids, params).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_write() {
        let text = render(&triangle(), &[], &params());
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], ">  Input file      expr.tsv");
        assert_eq!(lines[1], ">  MI threshold    0");
        assert_eq!(lines[3], ">  DPI tolerance   0.1");
        assert_eq!(lines[4], ">  Subnetwork file ");
        assert_eq!(lines[5], "A\tB\t0.9\tC\t0.5");
        assert_eq!(lines[6], "B\tA\t0.9\tC\t0.8");
        assert_eq!(lines[7], "C\tA\t0.5\tB\t0.8");
        assert_eq!(lines.len(), 8);
    }

    #[test]
    fn test_write_reduced_and_empty() {
        let mut graph = triangle();
        graph.set_intermediate(0, 2, 1);

        let text = render(&graph, &[], &params());
        assert!(text.contains("A\tB\t0.9\n"));

        let p = Params {
            write_reduced: true,
            write_empty: true,
            ..params()
        };
        let text = render(&graph, &[], &p);
        assert!(text.contains("A\tB\t0.9\tC.1\t0.5\n"));
        assert!(text.ends_with("\nD\n"));

        let text = render(&graph, &[3, 1], &p);
        let body: Vec<&str> = text.lines().filter(|l| !l.starts_with('>')).collect();
        assert_eq!(body, vec!["D", "B\tA\t0.9\tC\t0.8"]);
    }

    #[test]
    fn test_inactive_empty_gene() {
        let mut data = data();
        data.set_active(3, false);
        let graph = triangle();
        assert_eq!(gene_line(&data, &graph, 3, false, true), None);

        data.set_control(3, true);
        assert_eq!(gene_line(&data, &graph, 3, false, true), Some("D".to_string()));
    }

    #[test]
    fn test_read() {
        let text = ">  Input file      expr.tsv\n\
                    A\tB\t0.9\tC\t0.05\n\
                    C\tA\t0.05\tB\t0.8\n";
        let mut data = data();
        data.set_active(2, false);
        let mut graph = GeneGraph::new();

        let lines = read_adj(text.as_bytes(), &mut data, 0.1, &mut graph).unwrap();
        assert_eq!(lines, 2);
        assert!(data.marker(2).active);
        assert_eq!(graph.num_entries(), 2);
        assert_eq!(graph.edge(0, 1).map(|e| e.mi), Some(0.9));
        assert!(graph.edge(1, 0).is_none());
        assert!(graph.edge(0, 2).is_none());
    }

    #[test]
    fn test_read_errors() {
        let mut graph = GeneGraph::new();
        let result = read_adj("X\tA\t0.5\n".as_bytes(), &mut data(), 0.0, &mut graph);
        assert!(matches!(result, Err(NetError::UnknownMarker(ref m)) if m == "X"));

        let result = read_adj("A\tZ\t0.5\n".as_bytes(), &mut data(), 0.0, &mut graph);
        assert!(matches!(result, Err(NetError::UnknownMarker(_))));

        let result = read_adj("A\tB\tmany\n".as_bytes(), &mut data(), 0.0, &mut graph);
        assert!(matches!(result, Err(NetError::Format { line: 1, .. })));

        let result = read_adj("A\tB\t0.5\nB\tA\tnan\n".as_bytes(), &mut data(), 0.0, &mut graph);
        assert!(matches!(result, Err(NetError::Format { line: 2, .. })));
    }
}
