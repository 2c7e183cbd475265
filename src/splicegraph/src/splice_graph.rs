//! The splice graph: an arena-allocated DAG over pexons plus a synthetic
//! source/sink.

use crate::junction::Junction;
use crate::pexon::{Pexon, PexonBoundary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub lpos: i64,
    pub rpos: i64,
    pub length: i64,
    pub stddev: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    Junction,
    Boundary,
    Adjacency,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub source: VertexId,
    pub target: VertexId,
    pub weight: f64,
    pub kind: EdgeKind,
}

/// Arena-allocated DAG. Edges are addressed by stable [`EdgeId`]; removing an
/// edge tombstones its slot (see [`SpliceGraph::remove_edge`]) rather than
/// shifting indices, so callers holding an `EdgeId` across a mutation never
/// silently alias a different edge.
#[derive(Debug, Clone, Default)]
pub struct SpliceGraph {
    vertices: Vec<Vertex>,
    edges: Vec<Option<Edge>>,
}

pub const SOURCE: VertexId = VertexId(0);

impl SpliceGraph {
    pub fn sink(&self) -> VertexId {
        VertexId(self.vertices.len() - 1)
    }

    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id.0]
    }

    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex)> {
        self.vertices.iter().enumerate().map(|(i, v)| (VertexId(i), v))
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.0).and_then(|e| e.as_ref())
    }

    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges.iter().enumerate().filter_map(|(i, e)| e.as_ref().map(|e| (EdgeId(i), e)))
    }

    /// `pexon_index + 1`, the vertex id of the splice-graph vertex for
    /// `pexons[pexon_index]`.
    pub fn vertex_of_pexon(pexon_index: usize) -> VertexId {
        VertexId(pexon_index + 1)
    }

    /// Append a new edge to the arena. Exposed crate-wide so boundary
    /// extension can add edges after the initial build.
    pub(crate) fn add_edge(&mut self, source: VertexId, target: VertexId, weight: f64, kind: EdgeKind) -> EdgeId {
        self.push_edge(source, target, weight, kind)
    }

    fn push_edge(&mut self, source: VertexId, target: VertexId, weight: f64, kind: EdgeKind) -> EdgeId {
        assert!(source.0 < target.0, "splice graph edges must run source index < target index");
        let id = EdgeId(self.edges.len());
        self.edges.push(Some(Edge { source, target, weight: weight.max(1.0), kind }));
        id
    }

    pub fn remove_edge(&mut self, id: EdgeId) {
        self.edges[id.0] = None;
    }

    fn degree(&self, v: VertexId) -> usize {
        self.edges().filter(|(_, e)| e.source == v || e.target == v).count()
    }

    /// Build the graph for one bundle's pexons and linked junctions.
    pub fn build(pexons: &[Pexon], junctions: &[Junction]) -> Self {
        let mut g = SpliceGraph::default();
        g.vertices.push(Vertex { lpos: 0, rpos: 0, length: 0, stddev: 0.0, weight: 1.0 }); // source
        for p in pexons {
            g.vertices.push(Vertex { lpos: p.lpos, rpos: p.rpos, length: p.length(), stddev: p.dev, weight: p.ave });
        }
        g.vertices.push(Vertex { lpos: 0, rpos: 0, length: 0, stddev: 0.0, weight: 1.0 }); // sink

        for j in junctions {
            if let (Some(a), Some(b)) = (j.lexon, j.rexon) {
                let source = Self::vertex_of_pexon(a);
                let target = Self::vertex_of_pexon(b);
                g.push_edge(source, target, j.count as f64, EdgeKind::Junction);
            }
        }

        for i in 0..pexons.len().saturating_sub(1) {
            if pexons[i].rpos == pexons[i + 1].lpos {
                let source = Self::vertex_of_pexon(i);
                let target = Self::vertex_of_pexon(i + 1);
                let (d_i, d_j) = (g.degree(source), g.degree(target));
                let weight = if d_i <= d_j { pexons[i].ave } else { pexons[i + 1].ave };
                g.push_edge(source, target, weight, EdgeKind::Adjacency);
            }
        }

        for (i, p) in pexons.iter().enumerate() {
            let v = Self::vertex_of_pexon(i);
            if p.ltype == PexonBoundary::StartBoundary {
                let incoming: f64 = g.edges().filter(|(_, e)| e.target == v).map(|(_, e)| e.weight).sum();
                g.push_edge(SOURCE, v, p.ave - incoming, EdgeKind::Boundary);
            }
            if p.rtype == PexonBoundary::EndBoundary {
                let outgoing: f64 = g.edges().filter(|(_, e)| e.source == v).map(|(_, e)| e.weight).sum();
                let sink = g.sink();
                g.push_edge(v, sink, p.ave - outgoing, EdgeKind::Boundary);
            }
        }

        g
    }
}
