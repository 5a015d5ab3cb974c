mod sequencer_tests;
