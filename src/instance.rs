use std::fs;

use nom::IResult;
use nom::character::complete::{digit1, multispace0};
use nom::combinator::map_res;
use nom::sequence::preceded;

use crate::color::VertexId;
use crate::error::SolverError;

/** models an equitable coloring instance. */
#[derive(Debug)]
pub struct Instance {
    /// nb vertices
    n: usize,
    /// edges of the graph (0-indexed, deduplicated, a < b)
    edges: Vec<(VertexId,VertexId)>,
    /// adj_list[i]: list of vertices adjacent to i
    adj_list: Vec<Vec<VertexId>>,
    /// largest vertex degree
    max_degree: usize,
}

impl Instance {

    /** constructor using a 0-indexed edge list.
    Rejects self-loops and out-of-range endpoints; removes duplicate edges. */
    pub fn new(n:usize, edges:Vec<(VertexId,VertexId)>) -> Result<Self, SolverError> {
        if n == 0 {
            return Err(SolverError::Instance("graph has no vertices".to_string()));
        }
        let mut normalized:Vec<(VertexId,VertexId)> = Vec::with_capacity(edges.len());
        for (a,b) in edges {
            if a == b {
                return Err(SolverError::Instance(format!("self-loop on vertex {}", a)));
            }
            if a >= n || b >= n {
                return Err(SolverError::Instance(format!("edge endpoint out of range: ({},{})", a, b)));
            }
            normalized.push(if a < b { (a,b) } else { (b,a) });
        }
        normalized.sort_unstable();
        normalized.dedup();
        let mut adj_list = vec![Vec::new() ; n];
        for (a,b) in &normalized {
            adj_list[*a].push(*b);
            adj_list[*b].push(*a);
        }
        let max_degree = adj_list.iter().map(|l| l.len()).max().unwrap();
        Ok(Self { n, edges:normalized, adj_list, max_degree })
    }

    /** creates an instance from an edge-list file:
    first line `n m`, then m lines `a b` (1-indexed). */
    pub fn from_file(filename:&str) -> Result<Self, SolverError> {
        let content = fs::read_to_string(filename)?;
        Self::parse(&content)
    }

    /// parses the edge-list format from a string
    pub fn parse(content:&str) -> Result<Self, SolverError> {
        let (mut remaining, (n,m)) = read_header(content)
            .map_err(|_| SolverError::Instance("malformed header (expected `n m`)".to_string()))?;
        let mut edges = Vec::with_capacity(m);
        for i in 0..m {
            let (rest, (a,b)) = read_edge(remaining)
                .map_err(|_| SolverError::Instance(format!("malformed edge line {}", i+1)))?;
            remaining = rest;
            if a == 0 || a > n || b == 0 || b > n {
                return Err(SolverError::Instance(
                    format!("edge endpoint out of range: ({},{})", a, b)
                ));
            }
            edges.push((a-1, b-1));
        }
        Self::new(n, edges)
    }

    /// returns the number of vertices in the graph
    pub fn nb_vertices(&self) -> usize { self.n }

    /// returns the number of edges in the graph
    pub fn nb_edges(&self) -> usize { self.edges.len() }

    /// returns the neighbors of vertex u
    pub fn neighbors(&self, u:VertexId) -> &[VertexId] { &self.adj_list[u] }

    /// number of neighbors of vertex u
    pub fn degree(&self, u:VertexId) -> usize { self.adj_list[u].len() }

    /// largest degree in the graph
    pub fn max_degree(&self) -> usize { self.max_degree }

    /// returns all edges in the instance
    pub fn edges(&self) -> &[(VertexId, VertexId)] { &self.edges }

    /// iterator over vertices of the graph
    pub fn vertices(&self) -> std::ops::Range<VertexId> { 0..self.n }

    /// returns true iff u and v are adjacent
    pub fn are_adjacent(&self, u:VertexId, v:VertexId) -> bool {
        self.adj_list[u].iter().any(|c| &v==c)
    }

    /// displays various information about the instance
    pub fn display_statistics(&self) {
        println!("\t{} \t vertices", self.nb_vertices());
        println!("\t{} \t edges", self.nb_edges());
        println!("\t{} \t max degree", self.max_degree());
    }
}


/// reads an integer, skipping leading whitespace
fn read_integer(s:&str) -> IResult<&str, usize> {
    preceded(multispace0, map_res(digit1, |d:&str| d.parse::<usize>()))(s)
}

/// reads the header containing (n,m)
fn read_header(s:&str) -> IResult<&str, (usize,usize)> {
    let (remaining, n) = read_integer(s)?;
    let (remaining2, m) = read_integer(remaining)?;
    Ok((remaining2, (n,m)))
}

/// reads an edge line (WARNING: indices start at 1 in the input format)
fn read_edge(s:&str) -> IResult<&str, (usize,usize)> {
    let (remaining, a) = read_integer(s)?;
    let (remaining2, b) = read_integer(remaining)?;
    Ok((remaining2, (a,b)))
}
