//! Query parser selection (`defType`) and the parameters each parser accepts

use serde::{Deserialize, Serialize};

use crate::queries::params::ParamList;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DefType {
    Lucene(LuceneQuery),
    Dismax(DismaxQuery),
    Edismax(EdismaxQuery),
}

impl DefType {
    pub(crate) fn append_params(&self, params: &mut ParamList) {
        match self {
            DefType::Lucene(q) => q.append_params(params),
            DefType::Dismax(q) => q.append_params(params),
            DefType::Edismax(q) => q.append_params(params),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryOperator {
    AND,
    OR,
}

impl QueryOperator {
    fn as_str(&self) -> &'static str {
        match self {
            QueryOperator::AND => "AND",
            QueryOperator::OR => "OR",
        }
    }
}

/// Standard Lucene query parser.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LuceneQuery {
    pub q_op: Option<QueryOperator>,
    pub df: Option<String>,
    pub sow: Option<bool>,
}

impl LuceneQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn q_op(mut self, q_op: QueryOperator) -> Self {
        self.q_op = Some(q_op);
        self
    }

    pub fn df(mut self, df: impl Into<String>) -> Self {
        self.df = Some(df.into());
        self
    }

    pub fn sow(mut self, sow: bool) -> Self {
        self.sow = Some(sow);
        self
    }

    fn append_params(&self, params: &mut ParamList) {
        params.push("defType", "lucene");
        params.push_opt("q.op", self.q_op.map(|op| op.as_str()));
        params.push_opt("df", self.df.as_deref());
        params.push_opt("sow", self.sow);
    }
}

impl From<LuceneQuery> for DefType {
    fn from(query: LuceneQuery) -> Self {
        DefType::Lucene(query)
    }
}

/// DisMax query parser.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DismaxQuery {
    pub q_alt: Option<String>,
    pub qf: Option<String>,
    pub mm: Option<String>,
    pub pf: Option<String>,
    pub ps: Option<String>,
    pub qs: Option<String>,
    pub tie: Option<String>,
    pub bq: Vec<String>,
    pub bf: Vec<String>,
}

impl DismaxQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn q_alt(mut self, q_alt: impl Into<String>) -> Self {
        self.q_alt = Some(q_alt.into());
        self
    }

    pub fn qf(mut self, qf: impl Into<String>) -> Self {
        self.qf = Some(qf.into());
        self
    }

    pub fn mm(mut self, mm: impl Into<String>) -> Self {
        self.mm = Some(mm.into());
        self
    }

    pub fn pf(mut self, pf: impl Into<String>) -> Self {
        self.pf = Some(pf.into());
        self
    }

    pub fn ps(mut self, ps: impl Into<String>) -> Self {
        self.ps = Some(ps.into());
        self
    }

    pub fn qs(mut self, qs: impl Into<String>) -> Self {
        self.qs = Some(qs.into());
        self
    }

    pub fn tie(mut self, tie: impl Into<String>) -> Self {
        self.tie = Some(tie.into());
        self
    }

    pub fn bq<S: Into<String>, I: IntoIterator<Item = S>>(mut self, bq: I) -> Self {
        self.bq = bq.into_iter().map(Into::into).collect();
        self
    }

    pub fn bf<S: Into<String>, I: IntoIterator<Item = S>>(mut self, bf: I) -> Self {
        self.bf = bf.into_iter().map(Into::into).collect();
        self
    }

    fn append_common(&self, params: &mut ParamList) {
        params.push_opt("q.alt", self.q_alt.as_deref());
        params.push_opt("qf", self.qf.as_deref());
        params.push_opt("mm", self.mm.as_deref());
        params.push_opt("pf", self.pf.as_deref());
        params.push_opt("ps", self.ps.as_deref());
        params.push_opt("qs", self.qs.as_deref());
        params.push_opt("tie", self.tie.as_deref());
        for bq in &self.bq {
            params.push("bq", bq.as_str());
        }
        for bf in &self.bf {
            params.push("bf", bf.as_str());
        }
    }

    fn append_params(&self, params: &mut ParamList) {
        params.push("defType", "dismax");
        self.append_common(params);
    }
}

impl From<DismaxQuery> for DefType {
    fn from(query: DismaxQuery) -> Self {
        DefType::Dismax(query)
    }
}

/// Extended DisMax query parser. Accepts every DisMax parameter plus its own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdismaxQuery {
    pub dismax: DismaxQuery,
    pub mm_auto_relax: Option<bool>,
    pub pf2: Option<String>,
    pub pf3: Option<String>,
    pub ps2: Option<String>,
    pub ps3: Option<String>,
    pub sow: Option<bool>,
    pub boost: Vec<String>,
    pub lowercase_operators: Option<bool>,
    pub stopwords: Option<bool>,
    pub uf: Option<String>,
}

impl EdismaxQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing set of DisMax parameters.
    pub fn from_dismax(dismax: DismaxQuery) -> Self {
        Self {
            dismax,
            ..Self::default()
        }
    }

    pub fn q_alt(mut self, q_alt: impl Into<String>) -> Self {
        self.dismax.q_alt = Some(q_alt.into());
        self
    }

    pub fn qf(mut self, qf: impl Into<String>) -> Self {
        self.dismax.qf = Some(qf.into());
        self
    }

    pub fn mm(mut self, mm: impl Into<String>) -> Self {
        self.dismax.mm = Some(mm.into());
        self
    }

    pub fn pf(mut self, pf: impl Into<String>) -> Self {
        self.dismax.pf = Some(pf.into());
        self
    }

    pub fn tie(mut self, tie: impl Into<String>) -> Self {
        self.dismax.tie = Some(tie.into());
        self
    }

    pub fn mm_auto_relax(mut self, relax: bool) -> Self {
        self.mm_auto_relax = Some(relax);
        self
    }

    pub fn pf2(mut self, pf2: impl Into<String>) -> Self {
        self.pf2 = Some(pf2.into());
        self
    }

    pub fn pf3(mut self, pf3: impl Into<String>) -> Self {
        self.pf3 = Some(pf3.into());
        self
    }

    pub fn ps2(mut self, ps2: impl Into<String>) -> Self {
        self.ps2 = Some(ps2.into());
        self
    }

    pub fn ps3(mut self, ps3: impl Into<String>) -> Self {
        self.ps3 = Some(ps3.into());
        self
    }

    pub fn sow(mut self, sow: bool) -> Self {
        self.sow = Some(sow);
        self
    }

    pub fn boost<S: Into<String>, I: IntoIterator<Item = S>>(mut self, boost: I) -> Self {
        self.boost = boost.into_iter().map(Into::into).collect();
        self
    }

    pub fn lowercase_operators(mut self, lowercase: bool) -> Self {
        self.lowercase_operators = Some(lowercase);
        self
    }

    pub fn stopwords(mut self, stopwords: bool) -> Self {
        self.stopwords = Some(stopwords);
        self
    }

    pub fn uf(mut self, uf: impl Into<String>) -> Self {
        self.uf = Some(uf.into());
        self
    }

    fn append_params(&self, params: &mut ParamList) {
        params.push("defType", "edismax");
        self.dismax.append_common(params);
        params.push_opt("mm.autoRelax", self.mm_auto_relax);
        params.push_opt("pf2", self.pf2.as_deref());
        params.push_opt("pf3", self.pf3.as_deref());
        params.push_opt("ps2", self.ps2.as_deref());
        params.push_opt("ps3", self.ps3.as_deref());
        params.push_opt("sow", self.sow);
        for boost in &self.boost {
            params.push("boost", boost.as_str());
        }
        params.push_opt("lowercaseOperators", self.lowercase_operators);
        params.push_opt("stopwords", self.stopwords);
        params.push_opt("uf", self.uf.as_deref());
    }
}

impl From<EdismaxQuery> for DefType {
    fn from(query: EdismaxQuery) -> Self {
        DefType::Edismax(query)
    }
}
