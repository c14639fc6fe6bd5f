//! Built-in help topics. Also the seed content of the knowledge base.

use std::sync::LazyLock;

use crate::store::KbEntry;

/// A help topic and the keywords that select it.
#[derive(Debug)]
pub struct FaqTopic {
    /// Lowercase keywords; the first one doubles as the knowledge-base title.
    pub keywords: &'static [&'static str],
    pub body: &'static str,
}

impl FaqTopic {
    pub fn title(&self) -> &'static str {
        self.keywords.first().copied().unwrap_or_default()
    }

    fn matches(&self, text: &str) -> bool {
        self.keywords.iter().any(|k| text.contains(k))
    }
}

pub static FAQ_TOPICS: &[FaqTopic] = &[
    FaqTopic {
        keywords: &["primeira consulta", "primeira vez", "começar", "iniciar"],
        body: "*Primeira consulta de pré-natal*\n\
• Anamnese, PA, peso/altura (IMC), exame físico\n\
• Exames iniciais: hemograma, tipagem/Rh, glicemia, sorologias, urina/urocultura\n\
• Orientações: ácido fólico, vacinas, calendário e sinais de alerta",
    },
    FaqTopic {
        keywords: &["consultas", "calendário", "frequência", "quantas consultas"],
        body: "*Calendário de consultas*\n\
• Até 34s: mensais | 34–36s: quinzenais | >36s: semanais\n\
• Mínimo recomendado: 6 consultas",
    },
    FaqTopic {
        keywords: &["alimentação", "dieta", "nutrição", "comida", "peso"],
        body: "*Alimentação na gestação*\n\
• Refeições fracionadas, hidratação adequada\n\
• Evitar carnes/ovos crus, álcool e excesso de cafeína",
    },
    FaqTopic {
        keywords: &["sintomas", "enjoo", "azia", "constipação", "dor nas costas", "inchaço"],
        body: "*Sintomas comuns e alívio*\n\
• Náuseas/azia/constipação/dor lombar/edema: medidas não farmacológicas\n\
• Procure serviço se dor intensa, sangramento, febre, cefaleia forte",
    },
    FaqTopic {
        keywords: &["sinais de alerta", "emergência", "perigo"],
        body: "*Sinais de alerta (procure serviço imediatamente / 192 SAMU)*\n\
• Sangramento, dor abdominal forte, febre, perda de líquido\n\
• Diminuição dos movimentos fetais, cefaleia intensa com visão turva",
    },
    FaqTopic {
        keywords: &["vacina", "vacinação", "imunização"],
        body: "*Vacinas*\n\
• dTpa (20–36s), Influenza (anual), Hepatite B e COVID-19 conforme indicação\n\
• Contraindicadas: tríplice viral, varicela",
    },
    FaqTopic {
        keywords: &["exames", "ultrassom", "laboratório", "sangue", "urina"],
        body: "*Exames por trimestre (resumo)*\n\
• 1º: hemograma, tipagem/Rh, glicemia, sorologias, urina/urocultura, US obstétrico\n\
• 2º: TOTG 24–28s, US morfológico\n\
• 3º: hemograma, sorologias de controle, cultura EGB 35–37s",
    },
    FaqTopic {
        keywords: &["diabetes", "glicose", "totg", "açúcar"],
        body: "*Diabetes gestacional*\n\
• Rastreamento com TOTG 75g (24–28s); dieta, exercícios e, se preciso, insulina",
    },
    FaqTopic {
        keywords: &["pressão alta", "hipertensão", "pré-eclâmpsia", "eclâmpsia"],
        body: "*Pressão na gravidez*\n\
• PA ≥140/90 após 20s pede avaliação\n\
• Sinais graves: cefaleia forte, escotomas, dor epigástrica, edema súbito",
    },
    FaqTopic {
        keywords: &["parto prematuro", "contrações", "antes da hora"],
        body: "*Trabalho de parto prematuro*\n\
• Contrações regulares <37s, dor lombar, pressão pélvica, sangramento/perda de líquido",
    },
    FaqTopic {
        keywords: &["faixa etária", "idade materna", "adolescente", "gravidez após 35"],
        body: "*Faixa etária e riscos*\n\
• <18 anos ou ≥35 anos podem ter maior chance de alguns eventos obstétricos\n\
• Não é diagnóstico; significa acompanhamento mais próximo e atento",
    },
];

pub const FAQ_MENU: &str = "*Ajuda/Informações* — você pode enviar `? tema` ou escrever em \
linguagem natural (ex.: \"dor de cabeça\", \"movimentos do bebê\").\n\
• `? primeira consulta` • `? consultas` • `? alimentação`\n\
• `? sintomas` • `? sinais de alerta` • `? vacinação`\n\
• `? exames` • `? diabetes` • `? pressão alta`\n\
• `? parto prematuro` • `? faixa etária`\n\
(Use `MENU` para ver esta lista; `CONTINUAR` volta ao questionário.)";

/// Every keyword, longest first.
pub static TRIGGER_WORDS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    let mut words: Vec<&'static str> = FAQ_TOPICS
        .iter()
        .flat_map(|t| t.keywords.iter().copied())
        .collect();
    words.sort_by_key(|w| std::cmp::Reverse(w.chars().count()));
    words.dedup();
    words
});

/// First topic with a keyword contained in `text` (already lowercased).
pub fn find_topic(text: &str) -> Option<&'static FaqTopic> {
    FAQ_TOPICS.iter().find(|t| t.matches(text))
}

/// Whether lowercased `text` mentions any topic keyword.
pub fn mentions_topic(text: &str) -> bool {
    TRIGGER_WORDS.iter().any(|w| text.contains(w))
}

/// Knowledge-base rows for the topic table.
pub fn kb_entries() -> Vec<KbEntry<'static>> {
    FAQ_TOPICS
        .iter()
        .map(|t| KbEntry {
            title: t.title(),
            body: t.body,
            tags: t.keywords.join(", "),
        })
        .collect()
}
